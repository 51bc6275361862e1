//! 対話式レビューモジュール
//!
//! 現在の検証者がまだ判定していない画像をランダムに選び、1枚ずつ判定を入力する。

use crate::catalog::Catalog;
use crate::error::{Result, ValidatorError};
use crate::store::ResultStore;
use dialoguer::Input;
use label_validator_common::Verdict;

/// 対話アクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// 判定（備考付き）
    Judge(Verdict, Option<String>),
    /// この画像をスキップ
    Skip,
    /// 保存して終了
    Quit,
}

/// 入力行をアクションに変換
///
/// `a` / `i` / `r` の後ろに空白区切りで備考を続けられる（例: `i 麺類ではない`）。
pub fn parse_action(input: &str) -> Option<ReviewAction> {
    let trimmed = input.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, Some(rest.trim())),
        None => (trimmed, None),
    };

    match head {
        "" | "s" => Some(ReviewAction::Skip),
        "q" | "Q" => Some(ReviewAction::Quit),
        _ => {
            let verdict = head.parse::<Verdict>().ok()?;
            let remark = rest.filter(|r| !r.is_empty()).map(str::to_string);
            Some(ReviewAction::Judge(verdict, remark))
        }
    }
}

/// セッション結果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub judged: usize,
    pub skipped: usize,
    /// 候補不足で表示できなかった枠
    pub missing: usize,
}

/// 対話式でレビュー
pub fn run_review(
    catalog: &Catalog,
    store: &ResultStore,
    validator: &str,
    count: usize,
) -> Result<ReviewSummary> {
    let picks = catalog.pick_random(count, |r| store.is_judged_by(&r.image_id, validator));

    let mut summary = ReviewSummary {
        missing: count.saturating_sub(picks.len()),
        ..Default::default()
    };

    println!("👤 検証者: {}", validator);
    println!("---");
    println!("操作: [a]accept [i]incorrect [r]reject（後ろに備考） [s]スキップ [q]終了");
    println!("---\n");

    for (idx, record) in picks.iter().enumerate() {
        println!("[{}/{}] {} ({})", idx + 1, count, record.image_id, record.file_path.display());
        for label in catalog.labels_of(record)? {
            println!("  - {}", label);
        }

        let action = loop {
            let input = prompt_action()?;
            match parse_action(&input) {
                Some(action) => break action,
                None => println!("  → 入力を認識できません: {}", input.trim()),
            }
        };

        match action {
            ReviewAction::Judge(verdict, remark) => {
                store.record(&record.image_id, validator, verdict, remark.as_deref());
                summary.judged += 1;
                println!("  → {}\n", verdict);
            }
            ReviewAction::Skip => {
                summary.skipped += 1;
                println!("  → スキップ\n");
            }
            ReviewAction::Quit => {
                println!("保存して終了します...");
                return Ok(summary);
            }
        }
    }

    for slot in 0..summary.missing {
        println!("[{}/{}] （未判定の画像がありません）", picks.len() + slot + 1, count);
    }

    Ok(summary)
}

/// Ctrl-C で中断したときの終了コード
pub const EXIT_INTERRUPTED: i32 = 130;

/// 中断時の保存結果から終了コードを決める（保存に失敗したら 1）
pub fn interrupt_exit_code<T>(saved: &Result<T>) -> i32 {
    match saved {
        Ok(_) => EXIT_INTERRUPTED,
        Err(_) => 1,
    }
}

fn prompt_action() -> Result<String> {
    Input::new()
        .with_prompt("判定")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| ValidatorError::Prompt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdicts() {
        assert_eq!(parse_action("a"), Some(ReviewAction::Judge(Verdict::Accept, None)));
        assert_eq!(
            parse_action("i  麺類ではない "),
            Some(ReviewAction::Judge(Verdict::Incorrect, Some("麺類ではない".into())))
        );
        assert_eq!(
            parse_action("reject blurry photo"),
            Some(ReviewAction::Judge(Verdict::Reject, Some("blurry photo".into())))
        );
    }

    #[test]
    fn test_parse_controls() {
        assert_eq!(parse_action(""), Some(ReviewAction::Skip));
        assert_eq!(parse_action("s"), Some(ReviewAction::Skip));
        assert_eq!(parse_action("q"), Some(ReviewAction::Quit));
        assert_eq!(parse_action("x"), None);
    }

    #[test]
    fn test_interrupt_exit_code() {
        assert_eq!(interrupt_exit_code(&Ok(())), EXIT_INTERRUPTED);
        let failed: Result<()> = Err(ValidatorError::Heartbeat("disk full".into()));
        assert_eq!(interrupt_exit_code(&failed), 1);
    }
}

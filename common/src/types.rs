//! 判定結果の型定義
//!
//! フロントエンド（CLI / GUI）で共有される型:
//! - ImageRecord: ファイル名から復元した画像情報
//! - Verdict: 検証者の判定
//! - Judgment: 画像×検証者ごとの判定記録

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// 備考なしを表す永続化用マーカー
pub const NO_REMARK: &str = "None";

/// 判定文字列の区切り
const JUDGMENT_SEPARATOR: &str = " - ";

/// 画像ID → (検証者名 → 判定)
pub type JudgmentMap = BTreeMap<String, BTreeMap<String, Judgment>>;

/// 永続化形式: 画像ID → (検証者名 → "<verdict> - <remark>")
pub type PersistedMap = BTreeMap<String, BTreeMap<String, String>>;

/// レビュー対象の画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// ファイル名から導出した安定ID（例: `123_4`）
    pub image_id: String,
    /// カテゴリコード（3文字、ファイル名の出現順）
    pub labels: Vec<String>,
    pub file_path: PathBuf,
}

/// 判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Accept,
    Incorrect,
    Reject,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Accept, Verdict::Incorrect, Verdict::Reject];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accept => "accept",
            Verdict::Incorrect => "incorrect",
            Verdict::Reject => "reject",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "accept" | "a" => Ok(Verdict::Accept),
            "incorrect" | "i" => Ok(Verdict::Incorrect),
            "reject" | "r" => Ok(Verdict::Reject),
            _ => Err(Error::InvalidJudgment(s.to_string())),
        }
    }
}

/// 1件の判定記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    pub image_id: String,
    pub validator_name: String,
    pub verdict: Verdict,
    /// 空の備考は `None` に正規化済み
    pub remark: Option<String>,
}

impl Judgment {
    pub fn new(
        image_id: impl Into<String>,
        validator_name: impl Into<String>,
        verdict: Verdict,
        remark: Option<&str>,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            validator_name: validator_name.into(),
            verdict,
            remark: normalize_remark(remark),
        }
    }

    /// 表示・永続化用の文字列 `"<verdict> - <remark>"`
    pub fn display_string(&self) -> String {
        format!(
            "{}{}{}",
            self.verdict,
            JUDGMENT_SEPARATOR,
            self.remark.as_deref().unwrap_or(NO_REMARK)
        )
    }

    /// 永続化文字列から復元
    ///
    /// 区切りのない `"accept"` のような旧形式は備考なしとして扱う。
    pub fn parse(image_id: &str, validator_name: &str, value: &str) -> Result<Self> {
        let (verdict, remark) = match value.split_once(JUDGMENT_SEPARATOR) {
            Some((verdict, remark)) => (verdict, Some(remark)),
            None => (value, None),
        };

        let verdict = match verdict.trim() {
            "accept" => Verdict::Accept,
            "incorrect" => Verdict::Incorrect,
            "reject" => Verdict::Reject,
            _ => return Err(Error::InvalidJudgment(value.to_string())),
        };

        let remark = remark.filter(|r| *r != NO_REMARK);

        Ok(Self::new(image_id, validator_name, verdict, remark))
    }
}

/// 空・空白のみ・`"None"` の備考を `None` にする
///
/// `"None"` は永続化形式で備考なしを表すため、メモリ上でも同じ扱いにそろえる。
pub fn normalize_remark(remark: Option<&str>) -> Option<String> {
    remark
        .map(str::trim)
        .filter(|r| !r.is_empty() && *r != NO_REMARK)
        .map(str::to_string)
}

/// 判定マップを永続化形式に変換
pub fn to_persisted(map: &JudgmentMap) -> PersistedMap {
    map.iter()
        .map(|(image_id, by_validator)| {
            let inner = by_validator
                .iter()
                .map(|(validator, judgment)| (validator.clone(), judgment.display_string()))
                .collect();
            (image_id.clone(), inner)
        })
        .collect()
}

/// 永続化形式から判定マップを復元
pub fn from_persisted(persisted: &PersistedMap) -> Result<JudgmentMap> {
    let mut map = JudgmentMap::new();
    for (image_id, by_validator) in persisted {
        let entry = map.entry(image_id.clone()).or_default();
        for (validator, value) in by_validator {
            entry.insert(validator.clone(), Judgment::parse(image_id, validator, value)?);
        }
    }
    Ok(map)
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "label-validator")]
#[command(about = "食品カテゴリラベル検証ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 未判定の画像をランダムに選んで判定する
    Review {
        /// 検証者の番号（0始まり、設定ファイルの並び順）
        #[arg(short = 'n', long, conflicts_with = "validator")]
        validator_index: Option<usize>,

        /// 検証者名
        #[arg(long)]
        validator: Option<String>,

        /// 1回のセッションで表示する枚数
        #[arg(short, long, default_value = "5")]
        count: usize,
    },

    /// 画像一覧とラベルを表示
    List,

    /// 判定状況を表示
    Status,

    /// 作業セットを保存
    ExportSet {
        /// 出力JSONファイル
        #[arg(required = true)]
        output: PathBuf,

        /// 画像ID（`画像ID=備考` で備考付き）
        #[arg(required = true)]
        images: Vec<String>,
    },

    /// 作業セットを読み込んで表示
    ImportSet {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 画像フォルダを設定
        #[arg(long)]
        set_image_dir: Option<PathBuf>,

        /// 結果保存フォルダを設定
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// カテゴリ辞書JSONを設定
        #[arg(long)]
        set_categories: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// `画像ID=備考` を分解
pub fn parse_staged_arg(arg: &str) -> (&str, Option<&str>) {
    match arg.split_once('=') {
        Some((image, remark)) => (image, Some(remark)),
        None => (arg, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_staged_arg() {
        assert_eq!(parse_staged_arg("123_4"), ("123_4", None));
        assert_eq!(parse_staged_arg("123_4=要確認"), ("123_4", Some("要確認")));
        assert_eq!(parse_staged_arg("1_0=a=b"), ("1_0", Some("a=b")));
    }

    #[test]
    fn test_cli_parses_review() {
        let cli = Cli::parse_from(["label-validator", "review", "-n", "2", "--count", "3"]);
        match cli.command {
            Commands::Review { validator_index, validator, count } => {
                assert_eq!(validator_index, Some(2));
                assert_eq!(validator, None);
                assert_eq!(count, 3);
            }
            _ => panic!("expected review"),
        }
    }
}

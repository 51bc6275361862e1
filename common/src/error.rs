//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 辞書にないカテゴリコード（ファイル名とカテゴリ辞書の不整合）
    #[error("Unknown category code: {0}")]
    UnknownCategory(String),

    #[error("Invalid category code: {0:?} (3文字である必要があります)")]
    InvalidCategoryCode(String),

    #[error("Invalid judgment: {0:?}")]
    InvalidJudgment(String),

    #[error("Validator index out of range: {index} (validators: {len})")]
    ValidatorOutOfRange { index: usize, len: usize },

    #[error("Config error: {0}")]
    Config(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

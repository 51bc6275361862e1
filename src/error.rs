use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("結果ファイルの書き込みに失敗: {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("結果ファイルが不正: {path}: {source}")]
    CorruptStore {
        path: String,
        #[source]
        source: label_validator_common::Error,
    },

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("ハートビートを開始できません: {0}")]
    Heartbeat(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Common(#[from] label_validator_common::Error),
}

pub type Result<T> = std::result::Result<T, ValidatorError>;

//! Label Validator Common Library
//!
//! CLIとGUIフロントエンドで共有される型とユーティリティ

pub mod category;
pub mod error;
pub mod roster;
pub mod types;

pub use category::CategoryDictionary;
pub use error::{Error, Result};
pub use roster::ValidatorRoster;
pub use types::{ImageRecord, Judgment, JudgmentMap, PersistedMap, Verdict, NO_REMARK};

//! 食品カテゴリラベル検証ツール
//!
//! - `scanner` / `catalog`: 画像フォルダの読み込みとラベル解決
//! - `store`: 判定結果の保持と永続化（ハートビートによるクラッシュ復旧）
//! - `working_set`: 作業セットの保存・読み込み

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod review;
pub mod scanner;
pub mod store;
pub mod working_set;

pub use catalog::Catalog;
pub use error::{Result, ValidatorError};
pub use store::{ResultStore, StoreCloser, StorePaths, StoreState};

//! 作業セットの保存・読み込み
//!
//! 一時的に並べた画像と備考の組を順序付きで保存する。判定結果ストアとは
//! 独立したセッション単位のファイル。

use crate::error::{Result, ValidatorError};
use crate::store::to_json_bytes;
use chrono::{DateTime, Local};
use label_validator_common::ImageRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedEntry {
    /// 画像の参照（画像IDまたはパス）
    pub image: String,
    #[serde(default)]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingSet {
    pub saved_at: Option<DateTime<Local>>,
    pub entries: Vec<StagedEntry>,
}

impl WorkingSet {
    pub fn new(entries: Vec<StagedEntry>) -> Self {
        Self {
            saved_at: None,
            entries,
        }
    }

    pub fn push(&mut self, image: impl Into<String>, remark: Option<&str>) {
        self.entries.push(StagedEntry {
            image: image.into(),
            remark: label_validator_common::types::normalize_remark(remark),
        });
    }

    /// `known` のどの画像IDにも一致しないエントリ（入力順）
    pub fn unknown_images<'a>(&'a self, known: &[ImageRecord]) -> Vec<&'a str> {
        self.entries
            .iter()
            .map(|e| e.image.as_str())
            .filter(|image| !known.iter().any(|r| r.image_id == *image))
            .collect()
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.saved_at = Some(Local::now());
        std::fs::write(path, to_json_bytes(&*self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ValidatorError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

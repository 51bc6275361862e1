use crate::error::{Result, ValidatorError};
use crate::store::StorePaths;
use label_validator_common::{CategoryDictionary, ValidatorRoster};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// レビュー対象の画像フォルダ
    pub image_dir: PathBuf,
    /// 判定結果とハートビートを置くフォルダ
    pub data_dir: PathBuf,
    /// カテゴリ辞書JSON（未設定なら `data_dir/categories.json`）
    pub categories: Option<PathBuf>,
    pub heartbeat_interval_secs: u64,
    pub validators: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("./app/images"),
            data_dir: PathBuf::from("./app"),
            categories: None,
            heartbeat_interval_secs: 60,
            validators: vec![
                "Jeffrey Chen".into(),
                "Nancy Li".into(),
                "Zoe Wang".into(),
                "Vivian Wu".into(),
            ],
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ValidatorError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("label-validator").join("config.json"))
    }

    pub fn store_paths(&self) -> StorePaths {
        StorePaths::in_dir(&self.data_dir)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.categories
            .clone()
            .unwrap_or_else(|| self.data_dir.join("categories.json"))
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn roster(&self) -> Result<ValidatorRoster> {
        Ok(ValidatorRoster::new(self.validators.iter().cloned())?)
    }

    pub fn load_categories(&self) -> Result<CategoryDictionary> {
        let path = self.categories_path();
        if !path.exists() {
            return Err(ValidatorError::FileNotFound(path.display().to_string()));
        }
        Ok(CategoryDictionary::from_file(&path)?)
    }
}

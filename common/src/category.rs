//! カテゴリ辞書モジュール
//!
//! 3文字のカテゴリコードを表示名に変換する。未登録コードは黙って
//! 読み飛ばさず、`Error::UnknownCategory` を返す。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// カテゴリコード長
pub const CODE_LEN: usize = 3;

/// カテゴリコード → 表示名
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CategoryDictionary {
    entries: BTreeMap<String, String>,
}

impl CategoryDictionary {
    /// (コード, 名前) の組から生成
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::validated(Self { entries })
    }

    /// JSON文字列から読み込み（`{"A01": "ご飯", ...}` 形式）
    pub fn from_json(json: &str) -> Result<Self> {
        let dict: Self = serde_json::from_str(json)?;
        Self::validated(dict)
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn validated(dict: Self) -> Result<Self> {
        if let Some(code) = dict.entries.keys().find(|c| c.chars().count() != CODE_LEN) {
            return Err(Error::InvalidCategoryCode(code.clone()));
        }
        Ok(dict)
    }

    /// 表示名を取得
    pub fn name_of(&self, code: &str) -> Result<&str> {
        self.entries
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownCategory(code.to_string()))
    }

    /// `"<code>: <name>"` 形式のラベル
    pub fn label_of(&self, code: &str) -> Result<String> {
        Ok(format!("{}: {}", code, self.name_of(code)?))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CategoryDictionary {
        CategoryDictionary::from_pairs([("A01", "Rice"), ("B02", "Noodles")]).unwrap()
    }

    #[test]
    fn test_label_of() {
        assert_eq!(sample().label_of("A01").unwrap(), "A01: Rice");
    }

    #[test]
    fn test_unknown_code_fails() {
        let err = sample().label_of("Z99").unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(ref c) if c == "Z99"));
    }

    #[test]
    fn test_from_json() {
        let dict = CategoryDictionary::from_json(r#"{"C03": "味噌汁", "D04": "Salad"}"#).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.name_of("C03").unwrap(), "味噌汁");
    }

    #[test]
    fn test_invalid_code_length_rejected() {
        let err = CategoryDictionary::from_pairs([("A1", "Rice")]).unwrap_err();
        assert!(matches!(err, Error::InvalidCategoryCode(_)));
    }
}

//! 検証者名簿
//!
//! 固定順の検証者リストと、現在選択中の検証者インデックス。
//! 選択状態は永続化しない。

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorRoster {
    names: Vec<String>,
    current: usize,
}

impl ValidatorRoster {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::Config("検証者が1人も登録されていません".into()));
        }
        Ok(Self { names, current: 0 })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &str {
        &self.names[self.current]
    }

    /// 現在の検証者を切り替え
    pub fn select(&mut self, index: usize) -> Result<&str> {
        if index >= self.names.len() {
            return Err(Error::ValidatorOutOfRange {
                index,
                len: self.names.len(),
            });
        }
        self.current = index;
        Ok(self.current())
    }

    /// 名前で選択
    pub fn select_by_name(&mut self, name: &str) -> Option<&str> {
        let index = self.names.iter().position(|n| n == name)?;
        self.current = index;
        Some(self.current())
    }
}

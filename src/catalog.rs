//! 画像カタログ
//!
//! スキャン済みの画像一覧とカテゴリ辞書を保持し、ラベル解決・ランダム抽出・
//! 前後移動を提供する。

use crate::error::Result;
use crate::scanner;
use label_validator_common::{CategoryDictionary, ImageRecord};
use rand::seq::SliceRandom;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Catalog {
    images: Vec<ImageRecord>,
    dictionary: CategoryDictionary,
    cursor: usize,
}

impl Catalog {
    pub fn new(images: Vec<ImageRecord>, dictionary: CategoryDictionary) -> Self {
        Self {
            images,
            dictionary,
            cursor: 0,
        }
    }

    /// フォルダをスキャンしてカタログを作成
    pub fn scan(folder: &Path, dictionary: CategoryDictionary) -> Result<Self> {
        Ok(Self::new(scanner::list_images(folder)?, dictionary))
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn dictionary(&self) -> &CategoryDictionary {
        &self.dictionary
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn find(&self, image_id: &str) -> Option<&ImageRecord> {
        self.images.iter().find(|r| r.image_id == image_id)
    }

    /// `"<code>: <name>"` のリスト。辞書にないコードがあればエラー
    pub fn labels_of(&self, record: &ImageRecord) -> Result<Vec<String>> {
        let labels = record
            .labels
            .iter()
            .map(|code| self.dictionary.label_of(code))
            .collect::<label_validator_common::Result<Vec<_>>>()?;
        Ok(labels)
    }

    /// `exclude` に該当しない画像を最大 `n` 枚、重複なしで抽出
    ///
    /// 候補が足りない場合はある分だけ返す。不足分の扱いは呼び出し側に任せる。
    pub fn pick_random<F>(&self, n: usize, exclude: F) -> Vec<&ImageRecord>
    where
        F: Fn(&ImageRecord) -> bool,
    {
        let mut candidates: Vec<&ImageRecord> =
            self.images.iter().filter(|&r| !exclude(r)).collect();

        let mut rng = rand::thread_rng();
        candidates.shuffle(&mut rng);
        candidates.truncate(n);
        candidates
    }

    /// 現在の画像
    pub fn current(&self) -> Option<&ImageRecord> {
        self.images.get(self.cursor)
    }

    /// 次の画像（末尾の次は先頭）
    pub fn next(&mut self) -> Option<&ImageRecord> {
        if self.images.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.images.len();
        self.current()
    }

    /// 前の画像（先頭の前は末尾）
    pub fn previous(&mut self) -> Option<&ImageRecord> {
        if self.images.is_empty() {
            return None;
        }
        self.cursor = if self.cursor == 0 {
            self.images.len() - 1
        } else {
            self.cursor - 1
        };
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidatorError;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn record(id: &str, codes: &[&str]) -> ImageRecord {
        ImageRecord {
            image_id: id.to_string(),
            labels: codes.iter().map(|c| c.to_string()).collect(),
            file_path: PathBuf::from(format!("{}.jpg", id)),
        }
    }

    fn dictionary() -> CategoryDictionary {
        CategoryDictionary::from_pairs([("A01", "Rice"), ("B02", "Noodles")]).unwrap()
    }

    fn catalog_of(n: usize) -> Catalog {
        let images = (0..n).map(|i| record(&format!("{}_0", i), &["A01"])).collect();
        Catalog::new(images, dictionary())
    }

    #[test]
    fn test_labels_of() {
        let catalog = Catalog::new(vec![], dictionary());
        let labels = catalog.labels_of(&record("123_4", &["A01", "B02"])).unwrap();
        assert_eq!(labels, vec!["A01: Rice", "B02: Noodles"]);
    }

    #[test]
    fn test_labels_of_unknown_code() {
        let catalog = Catalog::new(vec![], dictionary());
        let err = catalog.labels_of(&record("1_1", &["A01", "Z99"])).unwrap_err();
        assert!(matches!(
            err,
            ValidatorError::Common(label_validator_common::Error::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_pick_random_shortfall() {
        let catalog = catalog_of(3);
        let picked = catalog.pick_random(5, |_| false);
        assert_eq!(picked.len(), 3);

        let ids: HashSet<_> = picked.iter().map(|r| r.image_id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_pick_random_respects_exclude() {
        let catalog = catalog_of(10);
        let picked = catalog.pick_random(10, |r| r.image_id.starts_with('1'));
        assert_eq!(picked.len(), 9);
        assert!(picked.iter().all(|r| r.image_id != "1_0"));
    }

    #[test]
    fn test_pick_random_limits_count() {
        let catalog = catalog_of(10);
        assert_eq!(catalog.pick_random(4, |_| false).len(), 4);
        assert!(catalog.pick_random(0, |_| false).is_empty());
    }

    #[test]
    fn test_navigation_wraps() {
        let mut catalog = catalog_of(3);
        assert_eq!(catalog.current().unwrap().image_id, "0_0");
        assert_eq!(catalog.previous().unwrap().image_id, "2_0");
        assert_eq!(catalog.next().unwrap().image_id, "0_0");
        assert_eq!(catalog.next().unwrap().image_id, "1_0");
    }

    #[test]
    fn test_navigation_empty() {
        let mut catalog = catalog_of(0);
        assert!(catalog.current().is_none());
        assert!(catalog.next().is_none());
        assert!(catalog.previous().is_none());
    }

    #[test]
    fn test_find() {
        let catalog = catalog_of(3);
        assert!(catalog.find("2_0").is_some());
        assert!(catalog.find("9_9").is_none());
    }
}

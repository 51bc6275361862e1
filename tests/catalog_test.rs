//! カタログテスト
//!
//! フォルダのスキャン、ラベル解決、ランダム抽出を検証

use label_validator::catalog::Catalog;
use label_validator::error::ValidatorError;
use label_validator::store::{ResultStore, StorePaths};
use label_validator_common::{CategoryDictionary, Verdict};
use std::collections::HashSet;
use std::fs::File;
use tempfile::tempdir;

fn dictionary() -> CategoryDictionary {
    CategoryDictionary::from_pairs([("A01", "Rice"), ("B02", "Noodles"), ("C03", "Soup")])
        .expect("辞書の作成に失敗")
}

/// 命名規則どおりのファイルだけが対象
#[test]
fn test_scan_parses_and_filters() {
    let dir = tempdir().expect("Failed to create temp dir");
    File::create(dir.path().join("A01B02_123_4.jpg")).unwrap();
    File::create(dir.path().join("not_an_image.txt")).unwrap();

    let catalog = Catalog::scan(dir.path(), dictionary()).unwrap();
    assert_eq!(catalog.len(), 1);

    let record = &catalog.images()[0];
    assert_eq!(record.image_id, "123_4");
    assert_eq!(
        catalog.labels_of(record).unwrap(),
        vec!["A01: Rice", "B02: Noodles"]
    );
}

/// 辞書にないコードはエラー
#[test]
fn test_unknown_category_surfaces() {
    let dir = tempdir().expect("Failed to create temp dir");
    File::create(dir.path().join("A01Z99_5_0.png")).unwrap();

    let catalog = Catalog::scan(dir.path(), dictionary()).unwrap();
    let err = catalog.labels_of(&catalog.images()[0]).unwrap_err();
    assert!(err.to_string().contains("Z99"));
}

/// フォルダがない
#[test]
fn test_scan_missing_folder() {
    let result = Catalog::scan(std::path::Path::new("/nonexistent/path/12345"), dictionary());
    assert!(matches!(result, Err(ValidatorError::FolderNotFound(_))));
}

/// 候補が足りなければある分だけ返す
#[test]
fn test_pick_random_over_small_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    for name in ["A01_1_0.jpg", "B02_2_0.jpg", "C03_3_0.jpg"] {
        File::create(dir.path().join(name)).unwrap();
    }

    let catalog = Catalog::scan(dir.path(), dictionary()).unwrap();
    let picked = catalog.pick_random(5, |_| false);
    assert_eq!(picked.len(), 3);

    let ids: HashSet<_> = picked.iter().map(|r| r.image_id.as_str()).collect();
    assert_eq!(ids.len(), 3);
}

/// 判定済みの画像は同じ検証者には再表示されない
#[test]
fn test_pick_random_excludes_judged_images() {
    let images = tempdir().expect("Failed to create temp dir");
    let data = tempdir().expect("Failed to create temp dir");
    for name in ["A01_1_0.jpg", "B02_2_0.jpg", "C03_3_0.jpg", "A01C03_4_1.jpg"] {
        File::create(images.path().join(name)).unwrap();
    }

    let catalog = Catalog::scan(images.path(), dictionary()).unwrap();
    let store = ResultStore::open(StorePaths::in_dir(data.path())).unwrap();
    store.record("1_0", "Nancy Li", Verdict::Accept, None);
    store.record("4_1", "Nancy Li", Verdict::Reject, None);
    store.record("2_0", "Zoe Wang", Verdict::Accept, None);

    for _ in 0..10 {
        let picked = catalog.pick_random(4, |r| store.is_judged_by(&r.image_id, "Nancy Li"));
        let ids: HashSet<_> = picked.iter().map(|r| r.image_id.as_str()).collect();
        assert_eq!(ids, HashSet::from(["2_0", "3_0"]));
    }
    store.close().unwrap();
}

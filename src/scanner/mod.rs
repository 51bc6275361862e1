mod filename;

pub use filename::{parse_file_name, ParsedName};

use crate::error::{Result, ValidatorError};
use label_validator_common::ImageRecord;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// フォルダ直下の画像をスキャンして `ImageRecord` を作成
///
/// 命名規則に合わないファイルはレビュー対象外として黙って除外する。
pub fn list_images(folder: &Path) -> Result<Vec<ImageRecord>> {
    if !folder.is_dir() {
        return Err(ValidatorError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };

        match parse_file_name(file_name) {
            Some(parsed) => images.push(ImageRecord {
                image_id: parsed.image_id,
                labels: parsed.codes,
                file_path: path.to_path_buf(),
            }),
            None => debug!(file = file_name, "命名規則外のファイルを除外"),
        }
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_path.cmp(&b.file_path));

    // 同じIDの判定はストア上で1つにまとまってしまう
    for image_id in duplicate_ids(&images) {
        warn!(image_id, folder = %folder.display(), "同じ画像IDのファイルが複数あります");
    }

    Ok(images)
}

/// 複数のファイルに現れる画像ID（昇順）
pub fn duplicate_ids(images: &[ImageRecord]) -> Vec<&str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in images {
        *counts.entry(record.image_id.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(image_id, _)| image_id)
        .collect()
}

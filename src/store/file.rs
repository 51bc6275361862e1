//! 判定ファイルの読み書き
//!
//! 書き込みは一時ファイル経由のrenameで行い、途中で落ちても
//! 既存ファイルが半端な内容にならないようにする。

use crate::error::{Result, ValidatorError};
use label_validator_common::types::{from_persisted, to_persisted};
use label_validator_common::{JudgmentMap, PersistedMap};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// 4スペースインデントのJSON（非ASCIIはエスケープしない）
pub(crate) fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// 一時ファイルに書いてからrenameで置き換える
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let persist_err = |source: std::io::Error| ValidatorError::Persist {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persist_err)?;
    }

    let tmp = temp_path(path);
    {
        let mut file = File::create(&tmp).map_err(persist_err)?;
        file.write_all(bytes).map_err(persist_err)?;
        file.sync_all().map_err(persist_err)?;
    }
    fs::rename(&tmp, path).map_err(persist_err)?;
    Ok(())
}

/// 判定マップを書き込み
pub(crate) fn write_map(path: &Path, map: &JudgmentMap) -> Result<()> {
    let bytes = to_json_bytes(&to_persisted(map))?;
    write_atomic(path, &bytes)
}

/// 判定マップを読み込み
///
/// 壊れたファイルは空扱いにせずエラーにする（レビュー結果の唯一の写しのため）。
pub(crate) fn read_map(path: &Path) -> Result<JudgmentMap> {
    let corrupt = |source: label_validator_common::Error| ValidatorError::CorruptStore {
        path: path.display().to_string(),
        source,
    };

    let content = fs::read_to_string(path)?;
    let persisted: PersistedMap =
        serde_json::from_str(&content).map_err(|e| corrupt(e.into()))?;
    from_persisted(&persisted).map_err(corrupt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use label_validator_common::{Judgment, Verdict};
    use tempfile::tempdir;

    #[test]
    fn test_non_ascii_kept_unescaped() {
        let mut map = JudgmentMap::new();
        map.entry("1_0".into()).or_default().insert(
            "検証者".into(),
            Judgment::new("1_0", "検証者", Verdict::Accept, Some("おにぎり")),
        );

        let text = String::from_utf8(to_json_bytes(&to_persisted(&map)).unwrap()).unwrap();
        assert!(text.contains("おにぎり"));
        assert!(text.contains("\n    \"1_0\""));
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_atomic(&path, b"{}").unwrap();
        write_atomic(&path, b"{\"a\": {}}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\": {}}");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_read_map_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ invalid json }").unwrap();

        assert!(matches!(read_map(&path), Err(ValidatorError::CorruptStore { .. })));
    }

    #[test]
    fn test_read_map_invalid_verdict() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"1_0": {"A": "perhaps - None"}}"#).unwrap();

        assert!(matches!(read_map(&path), Err(ValidatorError::CorruptStore { .. })));
    }

    #[test]
    fn test_read_map_legacy_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        fs::write(&path, r#"{"./app/images/image_1.png": {"Nancy Li": "reject"}}"#).unwrap();

        let map = read_map(&path).unwrap();
        let j = &map["./app/images/image_1.png"]["Nancy Li"];
        assert_eq!(j.verdict, Verdict::Reject);
        assert_eq!(j.remark, None);
    }
}

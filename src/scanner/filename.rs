//! 画像ファイル名のパース
//!
//! 形式: `<コード3文字 × N><_数値ID>_<1桁>.<拡張子>`（例: `A01B02_123_4.jpg`）

use label_validator_common::category::CODE_LEN;
use regex::Regex;

/// ファイル名から取り出した情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub image_id: String,
    pub codes: Vec<String>,
}

/// ファイル名をパース（形式外なら `None`）
pub fn parse_file_name(file_name: &str) -> Option<ParsedName> {
    lazy_static::lazy_static! {
        static ref NAME_RE: Regex = Regex::new(
            // `\d` や大文字小文字無視の `[A-Z]` は全角数字などにも一致するのでASCIIで書く
            r"^((?:[A-Za-z0-9]{3})+)_([0-9]+)_([0-9])\.(?i:jpg|jpeg|png|bmp|gif|webp)$"
        ).unwrap();
    }

    let caps = NAME_RE.captures(file_name)?;
    let code_block = caps.get(1)?.as_str();
    let image_id = format!("{}_{}", caps.get(2)?.as_str(), caps.get(3)?.as_str());

    let chars: Vec<char> = code_block.chars().collect();
    let codes = chars
        .chunks(CODE_LEN)
        .map(|c| c.iter().collect::<String>())
        .collect();

    Some(ParsedName { image_id, codes })
}

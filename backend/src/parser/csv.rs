//! Delimited-text grids with encoding and delimiter auto-detection.
//!
//! Public data exports are often EUC-KR (CP949) rather than UTF-8, and may
//! carry title rows above the real header, so the first line is not trusted
//! for delimiter detection.

use serde_json::Value;
use std::path::Path;

use super::{Grid, GridReader};
use crate::error::{LoadError, LoadResult};

/// Lines sampled when detecting the delimiter.
const DELIMITER_SAMPLE_LINES: usize = 20;

/// Reads `.csv` / `.tsv` / `.txt` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvGridReader {
    /// Force a delimiter instead of detecting one
    pub delimiter: Option<char>,
}

impl GridReader for CsvGridReader {
    fn read_grid(&self, path: &Path) -> LoadResult<Grid> {
        let bytes = std::fs::read(path)?;
        let (grid, _, _) = parse_bytes(&bytes, self.delimiter)?;
        Ok(grid)
    }
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 wins, then EUC-KR if it decodes cleanly, then chardet's guess.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }
    if !encoding_rs::EUC_KR.decode_without_bom_handling(bytes).1 {
        return "euc-kr".to_string();
    }

    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "euc-kr" | "cp949" | "uhc" => "euc-kr".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| LoadError::Encoding(e.to_string()))?,
        "euc-kr" => decode_with(encoding_rs::EUC_KR, bytes)?,
        "windows-1252" => decode_with(encoding_rs::WINDOWS_1252, bytes)?,
        _ => String::from_utf8_lossy(bytes).to_string(),
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

fn decode_with(encoding: &'static encoding_rs::Encoding, bytes: &[u8]) -> LoadResult<String> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(LoadError::Encoding(format!("invalid {} byte sequence", used.name())));
    }
    Ok(text.into_owned())
}

/// Detect the delimiter by counting occurrences over the first lines
pub fn detect_delimiter(content: &str) -> char {
    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count: usize = content
            .lines()
            .take(DELIMITER_SAMPLE_LINES)
            .map(|line| line.matches(sep).count())
            .sum();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse decoded text into a grid of string cells.
pub fn parse_text(content: &str, delimiter: char) -> LoadResult<Grid> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| LoadError::Csv(format!("delimiter '{}' is not a single byte", delimiter)))?;

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| LoadError::Csv(format!("line {}: {}", line + 1, e)))?;
        grid.push(
            record
                .iter()
                .map(|field| Value::String(field.trim().to_string()))
                .collect(),
        );
    }

    Ok(grid)
}

/// Parse raw bytes, returning the grid with the encoding and delimiter used.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> LoadResult<(Grid, String, char)> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let grid = parse_text(&content, delimiter)?;
    Ok((grid, encoding, delimiter))
}

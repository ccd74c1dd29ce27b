//! Header-resolving loader.
//!
//! Transaction exports put title and notice rows above the real header, so
//! the header row is located by scanning for a marker column name. Rows below
//! it become JSON objects keyed by header. Several files are concatenated
//! into one [`RowSet`] in file order.

pub mod csv;
pub mod workbook;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult};
use crate::logs::{log_info_indent, log_success, log_warning};

pub use self::csv::CsvGridReader;
pub use self::workbook::WorkbookGridReader;

/// Raw cells of one sheet, no header assumed.
pub type Grid = Vec<Vec<Value>>;

/// Source of raw cell grids.
pub trait GridReader {
    fn read_grid(&self, path: &Path) -> LoadResult<Grid>;
}

/// Pick a reader from the file extension.
pub fn reader_for(path: &Path) -> LoadResult<Box<dyn GridReader>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(WorkbookGridReader)),
        "csv" | "txt" => Ok(Box::new(CsvGridReader::default())),
        "tsv" => Ok(Box::new(CsvGridReader { delimiter: Some('\t') })),
        _ => Err(LoadError::UnsupportedFormat(ext)),
    }
}

/// One loaded file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedFile {
    pub path: PathBuf,
    /// 0-based grid row holding the header
    pub header_row: usize,
    pub columns: Vec<String>,
    pub records: Vec<Value>,
}

/// Rows of every input file, in file order then in-file order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSet {
    /// Union of columns by first appearance
    pub columns: Vec<String>,
    pub records: Vec<Value>,
    pub sources: Vec<SourceInfo>,
}

/// Provenance of a file's rows inside a [`RowSet`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub path: PathBuf,
    pub header_row: usize,
    pub row_count: usize,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a file's rows.
    pub fn append(&mut self, file: LoadedFile) {
        for column in &file.columns {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }
        self.sources.push(SourceInfo {
            path: file.path,
            header_row: file.header_row,
            row_count: file.records.len(),
        });
        self.records.extend(file.records);
    }
}

/// Text of a cell as it would appear in the sheet.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// First row containing a cell equal to `marker`.
pub fn find_header_row(grid: &Grid, marker: &str) -> Option<usize> {
    grid.iter()
        .position(|row| row.iter().any(|cell| cell_text(cell) == marker))
}

/// Build records using `header_row` as the header.
///
/// Blank header cells become `열N` (1-based column), repeated names get a
/// `.N` suffix, fully blank rows are skipped.
pub fn records_from(grid: &Grid, header_row: usize) -> (Vec<String>, Vec<Value>) {
    let Some(header) = grid.get(header_row) else {
        return (Vec::new(), Vec::new());
    };

    let mut seen: HashMap<String, usize> = HashMap::new();
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let mut name = cell_text(cell);
            if name.is_empty() {
                name = format!("열{}", i + 1);
            }
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                format!("{}.{}", name, *count - 1)
            } else {
                name
            }
        })
        .collect();

    let records = grid
        .iter()
        .skip(header_row + 1)
        .filter(|row| row.iter().any(|cell| !cell_text(cell).is_empty()))
        .map(|row| {
            let mut obj = Map::new();
            for (i, column) in columns.iter().enumerate() {
                let value = row.get(i).cloned().unwrap_or_else(|| Value::String(String::new()));
                obj.insert(column.clone(), value);
            }
            Value::Object(obj)
        })
        .collect();

    (columns, records)
}

/// Load a file whose header row is already known.
pub fn load_with_header(path: &Path, header_row: usize) -> LoadResult<LoadedFile> {
    let grid = reader_for(path)?.read_grid(path)?;
    let (columns, records) = records_from(&grid, header_row);
    Ok(LoadedFile {
        path: path.to_path_buf(),
        header_row,
        columns,
        records,
    })
}

/// Load a file, locating the header row by `marker`.
pub fn load_file(path: &Path, marker: &str) -> LoadResult<LoadedFile> {
    let reader = reader_for(path)?;
    load_file_with(reader.as_ref(), path, marker)
}

/// Load a file through an explicit reader.
pub fn load_file_with(reader: &dyn GridReader, path: &Path, marker: &str) -> LoadResult<LoadedFile> {
    let grid = reader.read_grid(path)?;
    if grid.is_empty() {
        return Err(LoadError::EmptyFile(path.to_path_buf()));
    }

    let header_row = find_header_row(&grid, marker).ok_or_else(|| LoadError::HeaderNotFound {
        path: path.to_path_buf(),
        marker: marker.to_string(),
    })?;

    let (columns, records) = records_from(&grid, header_row);
    Ok(LoadedFile {
        path: path.to_path_buf(),
        header_row,
        columns,
        records,
    })
}

/// Load every file and concatenate the rows. The first failure aborts.
pub fn load_files(paths: &[PathBuf], marker: &str) -> LoadResult<RowSet> {
    let mut rows = RowSet::default();

    for path in paths {
        let file = load_file(path, marker)?;
        log_info_indent(
            format!(
                "{}: header at row {}, {} rows",
                path.display(),
                file.header_row + 1,
                file.records.len()
            ),
            1,
        );
        if file.records.is_empty() {
            log_warning(format!("{}: no rows below the header", path.display()));
        }
        rows.append(file);
    }

    log_success(format!("Loaded {} rows from {} file(s)", rows.len(), paths.len()));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| json!(c)).collect())
            .collect()
    }

    #[test]
    fn test_find_header_row() {
        let g = grid(&[
            &["실거래가 자료"],
            &[""],
            &["NO", "시군구", "계약년월"],
            &["1", "서울특별시 중구 명동", "202401"],
        ]);
        assert_eq!(find_header_row(&g, "시군구"), Some(2));
        assert_eq!(find_header_row(&g, "없는열"), None);
    }

    #[test]
    fn test_marker_must_match_whole_cell() {
        let g = grid(&[&["시군구 기준 자료"], &["시군구"]]);
        assert_eq!(find_header_row(&g, "시군구"), Some(1));
    }

    #[test]
    fn test_records_from_header() {
        let g = grid(&[
            &["junk"],
            &["시군구", "", "시군구"],
            &["a", "b", "c"],
            &["", "", ""],
            &["d"],
        ]);
        let (columns, records) = records_from(&g, 1);
        assert_eq!(columns, vec!["시군구", "열2", "시군구.1"]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["시군구.1"], "c");
        assert_eq!(records[1]["열2"], "");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = reader_for(Path::new("report.pdf")).err().unwrap();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "pdf"));
    }

    #[test]
    fn test_header_not_found_aborts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();

        let err = load_file(&path, "시군구").unwrap_err();
        assert!(matches!(err, LoadError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_two_files_different_header_rows() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        fs::write(
            &first,
            "시군구,계약년월,거래금액(만원)\n서울특별시 강남구 역삼동,202403,\"500,000\"\n",
        )
        .unwrap();
        fs::write(
            &second,
            "국토교통부 실거래가\n조회기간: 2024\n,,\n계약년월,시군구,거래금액(만원)\n202405,서울특별시 중구 명동,\"12,000\"\n",
        )
        .unwrap();

        let rows = load_files(&[first.clone(), second.clone()], "시군구").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.sources[0].header_row, 0);
        assert_eq!(rows.sources[1].header_row, 3);
        assert_eq!(rows.columns, vec!["시군구", "계약년월", "거래금액(만원)"]);

        // Columns are aligned by name, not position
        assert_eq!(rows.records[0]["시군구"], "서울특별시 강남구 역삼동");
        assert_eq!(rows.records[1]["시군구"], "서울특별시 중구 명동");
        assert_eq!(rows.records[1]["계약년월"], "202405");
        assert_eq!(rows.records[1]["거래금액(만원)"], "12,000");
    }

    #[test]
    fn test_load_with_known_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("known.csv");
        fs::write(&path, "title\n시군구,계약년월\nx,202401\n").unwrap();

        let file = load_with_header(&path, 1).unwrap();
        assert_eq!(file.columns, vec!["시군구", "계약년월"]);
        assert_eq!(file.records.len(), 1);
    }
}

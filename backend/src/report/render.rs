//! Renderers persist assembled output units.
//!
//! [`XlsxRenderer`] writes styled workbooks. The CSV and JSON renderers write
//! the cell values at their placements plus a layout describing header and
//! total regions and suggested column widths, for tools that style on their own.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::xlsx::XlsxRenderer;
use super::{OutputUnit, Placement, Sheet};
use crate::error::RenderResult;
use crate::models::Table;

/// Minimum suggested column width.
pub const MIN_COLUMN_WIDTH: usize = 15;

/// Padding added to the longest value of a column.
pub const COLUMN_PADDING: usize = 3;

/// Name of the layout manifest written next to CSV sheets.
pub const LAYOUT_FILE: &str = "layout.json";

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Styled workbook, one worksheet per sheet
    #[default]
    Xlsx,
    /// Directory with one CSV per sheet plus a layout manifest
    Csv,
    /// Single JSON document
    Json,
}

impl OutputFormat {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            OutputFormat::Xlsx => Box::new(XlsxRenderer),
            OutputFormat::Csv => Box::new(CsvRenderer),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}

/// Styled table writer.
pub trait Renderer {
    /// Persist `unit` under `dir`, returning the path written.
    fn render(&mut self, unit: &OutputUnit, dir: &Path) -> RenderResult<PathBuf>;
}

/// Layout of one sheet as handed to a styling step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetLayout {
    pub name: String,
    /// CSV file holding the sheet, when written separately
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub column_widths: Vec<usize>,
    pub tables: Vec<TableLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLayout {
    pub name: String,
    pub placement: Placement,
}

impl SheetLayout {
    pub fn of(sheet: &Sheet, file: Option<String>) -> Self {
        Self {
            name: sheet.name.clone(),
            file,
            column_widths: column_widths(&sheet_grid(sheet)),
            tables: sheet
                .tables
                .iter()
                .map(|t| TableLayout {
                    name: t.table.name.clone(),
                    placement: t.placement.clone(),
                })
                .collect(),
        }
    }
}

/// Cell text of a whole sheet, blank rows and cells where nothing is placed.
pub fn sheet_grid(sheet: &Sheet) -> Vec<Vec<String>> {
    let mut grid = vec![Vec::<String>::new(); sheet.end_row()];

    for placed in &sheet.tables {
        let start = placed.placement.start_row - 1;
        let col = placed.placement.start_col - 1;
        let lines = std::iter::once(placed.table.header.clone()).chain(
            placed
                .table
                .rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect::<Vec<String>>()),
        );

        for (offset, values) in lines.enumerate() {
            let line = &mut grid[start + offset];
            if line.len() < col + values.len() {
                line.resize(col + values.len(), String::new());
            }
            for (i, value) in values.into_iter().enumerate() {
                line[col + i] = value;
            }
        }
    }

    grid
}

/// Suggested width per column: longest value plus padding, never below the minimum.
pub fn column_widths(grid: &[Vec<String>]) -> Vec<usize> {
    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    (0..columns)
        .map(|c| {
            let longest = grid
                .iter()
                .filter_map(|row| row.get(c))
                .map(|v| v.chars().count())
                .max()
                .unwrap_or(0);
            (longest + COLUMN_PADDING).max(MIN_COLUMN_WIDTH)
        })
        .collect()
}

/// `dir/stem[.ext]`, adding `_2`, `_3`, ... while the path exists.
pub fn unique_path(dir: &Path, stem: &str, ext: Option<&str>) -> PathBuf {
    let build = |name: String| match ext {
        Some(ext) => dir.join(format!("{}.{}", name, ext)),
        None => dir.join(name),
    };

    let mut path = build(stem.to_string());
    let mut n = 2;
    while path.exists() {
        path = build(format!("{}_{}", stem, n));
        n += 1;
    }
    path
}

fn sheet_file_name(sheet: &Sheet, index: usize) -> String {
    let safe: String = sheet
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("{:02}_{}.csv", index + 1, safe)
}

/// Writes a directory per unit: one UTF-8 (BOM) CSV per sheet and `layout.json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn render(&mut self, unit: &OutputUnit, dir: &Path) -> RenderResult<PathBuf> {
        let target = unique_path(dir, &unit.name, None);
        fs::create_dir_all(&target)?;

        let mut layouts = Vec::with_capacity(unit.sheets.len());
        for (index, sheet) in unit.sheets.iter().enumerate() {
            let file_name = sheet_file_name(sheet, index);
            let mut file = File::create(target.join(&file_name))?;
            // Spreadsheet apps need the BOM to read UTF-8 Korean text
            file.write_all(b"\xEF\xBB\xBF")?;

            let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
            for line in sheet_grid(sheet) {
                if line.is_empty() {
                    writer.write_record([""])?;
                } else {
                    writer.write_record(&line)?;
                }
            }
            writer.flush()?;

            layouts.push(SheetLayout::of(sheet, Some(file_name)));
        }

        let manifest = serde_json::to_string_pretty(&layouts)?;
        fs::write(target.join(LAYOUT_FILE), manifest)?;

        Ok(target)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDocument<'a> {
    name: &'a str,
    sheets: Vec<JsonSheet<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSheet<'a> {
    name: &'a str,
    column_widths: Vec<usize>,
    tables: Vec<JsonTable<'a>>,
}

#[derive(Serialize)]
struct JsonTable<'a> {
    #[serde(flatten)]
    table: &'a Table,
    placement: &'a Placement,
}

/// Writes one JSON document per unit with tables and layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&mut self, unit: &OutputUnit, dir: &Path) -> RenderResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let target = unique_path(dir, &unit.name, Some("json"));

        let document = JsonDocument {
            name: &unit.name,
            sheets: unit
                .sheets
                .iter()
                .map(|sheet| JsonSheet {
                    name: &sheet.name,
                    column_widths: column_widths(&sheet_grid(sheet)),
                    tables: sheet
                        .tables
                        .iter()
                        .map(|t| JsonTable { table: &t.table, placement: &t.placement })
                        .collect(),
                })
                .collect(),
        };

        fs::write(&target, serde_json::to_string_pretty(&document)?)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use tempfile::tempdir;

    fn sample_table(name: &str) -> Table {
        Table {
            name: name.to_string(),
            header: vec!["동".into(), "2024년 3월".into(), "합계".into()],
            rows: vec![
                vec![Cell::text("역삼동"), Cell::Count(2), Cell::Count(2)],
                vec![Cell::text("합계"), Cell::Count(2), Cell::Count(2)],
            ],
            total_row: true,
            total_columns: vec![2],
        }
    }

    fn sample_unit() -> OutputUnit {
        let mut sheet = Sheet::new("강남구");
        sheet.push(sample_table("monthly"), 2);
        sheet.push(sample_table("again"), 2);
        OutputUnit { name: "20240101_000000_batch".into(), sheets: vec![sheet] }
    }

    #[test]
    fn test_sheet_grid_offsets() {
        let grid = sheet_grid(&sample_unit().sheets[0]);
        assert_eq!(grid.len(), 7);
        assert_eq!(grid[0], vec!["동", "2024년 3월", "합계"]);
        assert_eq!(grid[2][0], "합계");
        assert!(grid[3].is_empty());
        assert_eq!(grid[4][0], "동");
    }

    #[test]
    fn test_column_widths_floor() {
        let grid = vec![
            vec!["a".to_string(), "x".repeat(20)],
            vec!["bb".to_string()],
        ];
        assert_eq!(column_widths(&grid), vec![15, 23]);
    }

    #[test]
    fn test_unique_path_suffix() {
        let dir = tempdir().unwrap();
        let first = unique_path(dir.path(), "report", Some("json"));
        assert_eq!(first, dir.path().join("report.json"));
        fs::write(&first, "{}").unwrap();

        let second = unique_path(dir.path(), "report", Some("json"));
        assert_eq!(second, dir.path().join("report_2.json"));
        fs::write(&second, "{}").unwrap();
        assert_eq!(unique_path(dir.path(), "report", Some("json")), dir.path().join("report_3.json"));
    }

    #[test]
    fn test_csv_renderer_writes_sheets_and_layout() {
        let dir = tempdir().unwrap();
        let path = CsvRenderer.render(&sample_unit(), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("20240101_000000_batch"));

        let csv = fs::read_to_string(path.join("01_강남구.csv")).unwrap();
        let mut lines = csv.trim_start_matches('\u{feff}').lines();
        assert_eq!(lines.next(), Some("동,2024년 3월,합계"));
        assert_eq!(lines.next(), Some("역삼동,2,2"));

        let layout: Vec<SheetLayout> =
            serde_json::from_str(&fs::read_to_string(path.join(LAYOUT_FILE)).unwrap()).unwrap();
        assert_eq!(layout[0].tables.len(), 2);
        assert_eq!(layout[0].tables[1].placement.start_row, 5);
        assert_eq!(layout[0].tables[1].placement.total_rows, vec![7]);
        assert_eq!(layout[0].tables[1].placement.total_cols, vec![3]);
    }

    #[test]
    fn test_csv_renderer_never_overwrites() {
        let dir = tempdir().unwrap();
        let first = CsvRenderer.render(&sample_unit(), dir.path()).unwrap();
        let second = CsvRenderer.render(&sample_unit(), dir.path()).unwrap();
        assert_ne!(first, second);
        assert!(second.ends_with("20240101_000000_batch_2"));
    }

    #[test]
    fn test_json_renderer() {
        let dir = tempdir().unwrap();
        let path = JsonRenderer.render(&sample_unit(), dir.path()).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));

        let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["sheets"][0]["name"], "강남구");
        assert_eq!(doc["sheets"][0]["tables"][0]["rows"][0][1], 2);
        assert_eq!(doc["sheets"][0]["tables"][0]["totalRow"], true);
        assert_eq!(doc["sheets"][0]["tables"][1]["placement"]["startRow"], 5);
    }
}

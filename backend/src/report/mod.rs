//! Report assembler.
//!
//! Decides which tables go into which output unit and sheet, at what row
//! offset, and which regions need header or total styling. The resulting
//! [`OutputUnit`]s are everything a [`render::Renderer`] needs.
//!
//! Coordinates are 1-based like spreadsheet rows and columns. A table's
//! header sits on `start_row`, its data rows follow, and the next stacked
//! table starts at `end_row + gap`.

pub mod render;
pub mod xlsx;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::Table;

/// Output timestamp format.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// How tables are distributed over output units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
    /// One unit; one sheet per analysis with its tables stacked vertically
    #[default]
    Stacked,
    /// One unit per table
    Split,
}

/// Where a table sits and which parts are styled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub header_row: Option<usize>,
    pub total_rows: Vec<usize>,
    pub total_cols: Vec<usize>,
}

impl Placement {
    /// Placement of `table` with its header on `start_row`, first column 1.
    pub fn for_table(table: &Table, start_row: usize) -> Self {
        let end_row = start_row + table.len();
        Self {
            start_row,
            end_row,
            start_col: 1,
            end_col: table.width(),
            header_row: Some(start_row),
            total_rows: if table.total_row { vec![end_row] } else { Vec::new() },
            total_cols: table.total_columns.iter().map(|c| c + 1).collect(),
        }
    }
}

/// A table with its placement.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedTable {
    pub table: Table,
    pub placement: Placement,
}

/// A named sheet holding one or more tables.
#[derive(Debug, Clone, Serialize)]
pub struct Sheet {
    pub name: String,
    pub tables: Vec<PlacedTable>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), tables: Vec::new() }
    }

    /// Place `table` below the last one, `gap` rows after its end.
    pub fn push(&mut self, table: Table, gap: usize) -> &Placement {
        let start_row = self
            .tables
            .last()
            .map(|t| t.placement.end_row + gap)
            .unwrap_or(1);
        let placement = Placement::for_table(&table, start_row);
        self.tables.push(PlacedTable { table, placement });
        &self.tables[self.tables.len() - 1].placement
    }

    /// Last occupied row.
    pub fn end_row(&self) -> usize {
        self.tables.iter().map(|t| t.placement.end_row).max().unwrap_or(0)
    }

    /// Last occupied column.
    pub fn end_col(&self) -> usize {
        self.tables.iter().map(|t| t.placement.end_col).max().unwrap_or(0)
    }
}

/// One persisted artefact (a workbook, a directory, a file).
#[derive(Debug, Clone, Serialize)]
pub struct OutputUnit {
    /// File stem, `{timestamp}_{label}`
    pub name: String,
    pub sheets: Vec<Sheet>,
}

/// Tables of one analysis, destined for one sheet.
#[derive(Debug, Clone)]
pub struct Section {
    pub sheet: String,
    pub tables: Vec<Table>,
}

/// Format a run timestamp for output names.
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Output unit name from a timestamp and a label.
pub fn unit_name(timestamp: &str, label: &str) -> String {
    let label: String = label
        .chars()
        .map(|c| if c.is_whitespace() || matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{}_{}", timestamp, label)
}

/// Distribute sections over output units.
pub fn assemble(
    sections: Vec<Section>,
    strategy: LayoutStrategy,
    timestamp: &str,
    batch_label: &str,
    gap: usize,
) -> Vec<OutputUnit> {
    match strategy {
        LayoutStrategy::Stacked => {
            let sheets = sections
                .into_iter()
                .map(|section| {
                    let mut sheet = Sheet::new(section.sheet);
                    for table in section.tables {
                        sheet.push(table, gap);
                    }
                    sheet
                })
                .collect();
            vec![OutputUnit {
                name: unit_name(timestamp, batch_label),
                sheets,
            }]
        }
        LayoutStrategy::Split => sections
            .into_iter()
            .flat_map(|section| {
                let sheet_name = section.sheet;
                section.tables.into_iter().map(move |table| {
                    let label = format!("{}_{}", sheet_name, table.name);
                    let mut sheet = Sheet::new(sheet_name.clone());
                    sheet.push(table, gap);
                    OutputUnit {
                        name: unit_name(timestamp, &label),
                        sheets: vec![sheet],
                    }
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use chrono::NaiveDate;

    fn table(name: &str, rows: usize, cols: usize, total_row: bool, total_column: bool) -> Table {
        let header: Vec<String> = (0..cols).map(|c| format!("c{}", c)).collect();
        let rows = (0..rows)
            .map(|r| {
                let mut row = vec![Cell::text(format!("r{}", r))];
                row.extend((1..cols).map(|_| Cell::Count(0)));
                row
            })
            .collect();
        Table {
            name: name.to_string(),
            header,
            rows,
            total_row,
            total_columns: if total_column { vec![cols - 1] } else { Vec::new() },
        }
    }

    #[test]
    fn test_placement_for_table() {
        let placement = Placement::for_table(&table("t", 4, 5, true, true), 1);
        assert_eq!(placement.start_row, 1);
        assert_eq!(placement.end_row, 5);
        assert_eq!((placement.start_col, placement.end_col), (1, 5));
        assert_eq!(placement.header_row, Some(1));
        assert_eq!(placement.total_rows, vec![5]);
        assert_eq!(placement.total_cols, vec![5]);
    }

    #[test]
    fn test_stacked_offsets() {
        let mut sheet = Sheet::new("강남구");
        sheet.push(table("monthly", 3, 6, true, true), 2);
        sheet.push(table("yearly", 2, 3, false, false), 2);
        sheet.push(table("summary", 2, 16, false, false), 2);

        let placements: Vec<&Placement> = sheet.tables.iter().map(|t| &t.placement).collect();
        assert_eq!((placements[0].start_row, placements[0].end_row), (1, 4));
        assert_eq!((placements[1].start_row, placements[1].end_row), (6, 8));
        assert_eq!((placements[2].start_row, placements[2].end_row), (10, 12));
        assert!(placements[1].total_rows.is_empty());
        assert!(placements[1].total_cols.is_empty());
        assert_eq!(placements[2].header_row, Some(10));
        assert_eq!(sheet.end_row(), 12);
        assert_eq!(sheet.end_col(), 16);
    }

    #[test]
    fn test_unit_name() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 1)
            .unwrap();
        let stamp = format_timestamp(&ts);
        assert_eq!(stamp, "20240305_090701");
        assert_eq!(unit_name(&stamp, "실거래가_분석결과"), "20240305_090701_실거래가_분석결과");
        assert_eq!(unit_name(&stamp, "강남구_동별 월별"), "20240305_090701_강남구_동별_월별");
    }

    #[test]
    fn test_assemble_stacked() {
        let sections = vec![
            Section { sheet: "강남구".into(), tables: vec![table("a", 1, 2, false, false), table("b", 1, 2, false, false)] },
            Section { sheet: "서울시".into(), tables: vec![table("c", 1, 2, false, false)] },
        ];
        let units = assemble(sections, LayoutStrategy::Stacked, "20240101_000000", "batch", 2);

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "20240101_000000_batch");
        assert_eq!(units[0].sheets.len(), 2);
        assert_eq!(units[0].sheets[0].tables[1].placement.start_row, 4);
        assert_eq!(units[0].sheets[1].tables[0].placement.start_row, 1);
    }

    #[test]
    fn test_assemble_split() {
        let sections = vec![
            Section { sheet: "강남구".into(), tables: vec![table("a", 1, 2, false, false), table("b", 1, 2, false, false)] },
            Section { sheet: "서울시".into(), tables: vec![table("c", 1, 2, false, false)] },
        ];
        let units = assemble(sections, LayoutStrategy::Split, "20240101_000000", "batch", 2);

        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["20240101_000000_강남구_a", "20240101_000000_강남구_b", "20240101_000000_서울시_c"]);
        assert!(units.iter().all(|u| u.sheets.len() == 1 && u.sheets[0].tables.len() == 1));
        assert!(units.iter().all(|u| u.sheets[0].tables[0].placement.start_row == 1));
    }
}

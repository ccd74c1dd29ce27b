//! Spreadsheet grids read through calamine.

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{json, Value};
use std::path::Path;

use super::{Grid, GridReader};
use crate::error::{LoadError, LoadResult};

/// Reads the first worksheet of `.xlsx` / `.xlsm` / `.xls` / `.ods` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookGridReader;

impl GridReader for WorkbookGridReader {
    fn read_grid(&self, path: &Path) -> LoadResult<Grid> {
        let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Workbook(e.to_string()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoadError::EmptyFile(path.to_path_buf()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| LoadError::Workbook(e.to_string()))?;

        // The range starts at the first used cell; pad so indices are sheet-absolute
        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        let blank = || Value::String(String::new());

        let mut grid: Grid = (0..first_row).map(|_| Vec::new()).collect();
        grid.extend(range.rows().map(|row| {
            let mut cells: Vec<Value> = (0..first_col).map(|_| blank()).collect();
            cells.extend(row.iter().map(cell_to_value));
            cells
        }));
        Ok(grid)
    }
}

/// Convert a calamine cell, keeping numbers numeric.
pub(crate) fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::String(String::new()),
        Data::String(s) => Value::String(s.trim().to_string()),
        Data::Int(i) => json!(i),
        Data::Float(f) => {
            // Whole floats are integer codes (e.g. 202403.0)
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                json!(*f as i64)
            } else {
                json!(f)
            }
        }
        Data::Bool(b) => json!(b),
        other => Value::String(other.to_string()),
    }
}

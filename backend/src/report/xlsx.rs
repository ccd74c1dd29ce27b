//! Styled workbook output.
//!
//! One `.xlsx` per output unit, one worksheet per sheet. Every placed cell
//! gets a thin border and centered text; header rows and total rows/columns
//! get their own fill and bold font.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};

use super::render::{column_widths, sheet_grid, unique_path, Renderer};
use super::{OutputUnit, PlacedTable, Placement};
use crate::error::RenderResult;
use crate::models::Cell;

const BORDER_COLOR: &str = "#BFBFBF";
const HEADER_FILL: &str = "#4F81BD";
const HEADER_FONT: &str = "#FFFFFF";
const TOTAL_FILL: &str = "#DEEAF6";

/// Styling region of a placed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Body,
    Header,
    Total,
}

impl Region {
    /// Region of a 1-based cell. Total rows and columns win over the header.
    pub fn at(placement: &Placement, row: usize, col: usize) -> Self {
        if placement.total_rows.contains(&row) || placement.total_cols.contains(&col) {
            Region::Total
        } else if placement.header_row == Some(row) {
            Region::Header
        } else {
            Region::Body
        }
    }
}

struct Formats {
    body: Format,
    header: Format,
    total: Format,
}

impl Formats {
    fn new() -> Self {
        let body = Format::new()
            .set_border(FormatBorder::Thin)
            .set_border_color(BORDER_COLOR)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        let header = body
            .clone()
            .set_background_color(HEADER_FILL)
            .set_font_color(HEADER_FONT)
            .set_bold();
        let total = body.clone().set_background_color(TOTAL_FILL).set_bold();
        Self { body, header, total }
    }

    fn for_region(&self, region: Region) -> &Format {
        match region {
            Region::Body => &self.body,
            Region::Header => &self.header,
            Region::Total => &self.total,
        }
    }
}

/// Writes one styled workbook per unit.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxRenderer;

impl Renderer for XlsxRenderer {
    fn render(&mut self, unit: &OutputUnit, dir: &Path) -> RenderResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let target = unique_path(dir, &unit.name, Some("xlsx"));

        let formats = Formats::new();
        let mut workbook = Workbook::new();

        for sheet in &unit.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.name.as_str())?;

            for placed in &sheet.tables {
                write_table(worksheet, placed, &formats)?;
            }

            for (col, width) in column_widths(&sheet_grid(sheet)).into_iter().enumerate() {
                worksheet.set_column_width(col as u16, width as f64)?;
            }
        }

        workbook.save(&target)?;
        Ok(target)
    }
}

fn write_table(worksheet: &mut Worksheet, placed: &PlacedTable, formats: &Formats) -> RenderResult<()> {
    let placement = &placed.placement;

    for (i, name) in placed.table.header.iter().enumerate() {
        let (row, col) = (placement.start_row, placement.start_col + i);
        let format = formats.for_region(Region::at(placement, row, col));
        worksheet.write_string_with_format(row as u32 - 1, col as u16 - 1, name.as_str(), format)?;
    }

    for (r, cells) in placed.table.rows.iter().enumerate() {
        let row = placement.start_row + 1 + r;
        for (i, cell) in cells.iter().enumerate() {
            let col = placement.start_col + i;
            let format = formats.for_region(Region::at(placement, row, col));
            let (xr, xc) = (row as u32 - 1, col as u16 - 1);
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string_with_format(xr, xc, s.as_str(), format)?;
                }
                Cell::Count(n) => {
                    worksheet.write_number_with_format(xr, xc, *n as f64, format)?;
                }
                Cell::Decimal(Some(v)) => {
                    worksheet.write_number_with_format(xr, xc, *v, format)?;
                }
                Cell::Decimal(None) => {
                    worksheet.write_blank(xr, xc, format)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Table;
    use crate::report::Sheet;
    use calamine::{open_workbook_auto, Data, Reader};
    use tempfile::tempdir;

    fn sample_unit() -> OutputUnit {
        let table = Table {
            name: "금액대별".into(),
            header: vec!["구".into(), "50억 미만".into(), "합계".into()],
            rows: vec![
                vec![Cell::text("강남구"), Cell::Count(3), Cell::Count(3)],
                vec![Cell::text("합계"), Cell::Count(3), Cell::Count(3)],
            ],
            total_row: true,
            total_columns: vec![2],
        };
        let summary = Table {
            name: "연도별 월별".into(),
            header: vec!["년도".into(), "월평균(거래월)".into()],
            rows: vec![vec![Cell::text("2023년"), Cell::Decimal(None)]],
            total_row: false,
            total_columns: Vec::new(),
        };

        let mut brackets = Sheet::new("금액대별");
        brackets.push(table, 2);
        let mut city = Sheet::new("서울시");
        city.push(summary.clone(), 2);
        city.push(summary, 2);

        OutputUnit {
            name: "20240101_000000_실거래가_분석결과".into(),
            sheets: vec![brackets, city],
        }
    }

    #[test]
    fn test_region_precedence() {
        let placement = Placement {
            start_row: 1,
            end_row: 3,
            start_col: 1,
            end_col: 3,
            header_row: Some(1),
            total_rows: vec![3],
            total_cols: vec![3],
        };
        assert_eq!(Region::at(&placement, 1, 1), Region::Header);
        assert_eq!(Region::at(&placement, 1, 3), Region::Total);
        assert_eq!(Region::at(&placement, 2, 2), Region::Body);
        assert_eq!(Region::at(&placement, 2, 3), Region::Total);
        assert_eq!(Region::at(&placement, 3, 1), Region::Total);
    }

    #[test]
    fn test_workbook_values_at_placements() {
        let dir = tempdir().unwrap();
        let path = XlsxRenderer.render(&sample_unit(), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("20240101_000000_실거래가_분석결과.xlsx"));

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["금액대별".to_string(), "서울시".to_string()]);

        let brackets = workbook.worksheet_range("금액대별").unwrap();
        assert_eq!(brackets.get_value((0, 0)), Some(&Data::String("구".into())));
        assert_eq!(brackets.get_value((1, 1)), Some(&Data::Float(3.0)));
        assert_eq!(brackets.get_value((2, 0)), Some(&Data::String("합계".into())));

        let city = workbook.worksheet_range("서울시").unwrap();
        assert_eq!(city.get_value((3, 0)), Some(&Data::String("년도".into())));
        assert_eq!(city.get_value((4, 0)), Some(&Data::String("2023년".into())));
    }

    #[test]
    fn test_workbook_never_overwrites() {
        let dir = tempdir().unwrap();
        let first = XlsxRenderer.render(&sample_unit(), dir.path()).unwrap();
        let second = XlsxRenderer.render(&sample_unit(), dir.path()).unwrap();
        assert_ne!(first, second);
        assert_eq!(second, dir.path().join("20240101_000000_실거래가_분석결과_2.xlsx"));
    }
}

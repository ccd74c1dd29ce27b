//! Field normalizer.
//!
//! Derives typed fields from raw transaction cells: region tokens, contract
//! year-month and amount in 억원. Cells may be strings or numbers depending on
//! the source format.

use regex::Regex;
use serde_json::Value;

use crate::config::ReportConfig;
use crate::error::{ConfigResult, NormalizeError, NormalizeResult};
use crate::models::YearMonth;
use crate::parser::cell_text;

/// 만원 per 억원.
pub const MANWON_PER_EOK: f64 = 10_000.0;

/// Region, year-month and amount columns of one run, with the compiled
/// district pattern.
#[derive(Debug, Clone)]
pub struct Normalizer {
    region_column: String,
    year_month_column: String,
    amount_column: String,
    district_pattern: Regex,
}

impl Normalizer {
    pub fn new(config: &ReportConfig) -> ConfigResult<Self> {
        Ok(Self {
            region_column: config.region_column.clone(),
            year_month_column: config.year_month_column.clone(),
            amount_column: config.amount_column.clone(),
            district_pattern: config.district_pattern()?,
        })
    }

    /// Region path text; empty when the cell is blank.
    pub fn region(&self, record: &Value, row: usize) -> NormalizeResult<String> {
        field(record, &self.region_column, row).map(cell_text)
    }

    pub fn year_month(&self, record: &Value, row: usize) -> NormalizeResult<YearMonth> {
        parse_year_month(field(record, &self.year_month_column, row)?, row)
    }

    /// Amount in 억원.
    pub fn amount(&self, record: &Value, row: usize) -> NormalizeResult<f64> {
        parse_amount(field(record, &self.amount_column, row)?, row)
    }

    /// District following the configured city prefix, if any.
    pub fn prefixed_district(&self, region: &str) -> Option<String> {
        self.district_pattern
            .captures(region)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

fn field<'a>(record: &'a Value, column: &str, row: usize) -> NormalizeResult<&'a Value> {
    match record.get(column) {
        Some(Value::Null) | None => Err(NormalizeError::MissingColumn {
            row,
            column: column.to_string(),
        }),
        Some(value) => Ok(value),
    }
}

/// Parse a `YYYYMM` cell.
///
/// Numeric cells are read as their integer text. The result must be exactly
/// six ASCII digits with a month in 1-12.
pub fn parse_year_month(value: &Value, row: usize) -> NormalizeResult<YearMonth> {
    let text = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => cell_text(other),
    };

    if text.len() != 6 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NormalizeError::InvalidYearMonth { row, value: text });
    }

    let invalid = || NormalizeError::InvalidYearMonth { row, value: text.clone() };
    let year: i32 = text[..4].parse().map_err(|_| invalid())?;
    let month: u32 = text[4..].parse().map_err(|_| invalid())?;

    if !(1..=12).contains(&month) {
        return Err(NormalizeError::MonthOutOfRange { row, month });
    }

    Ok(YearMonth::new(year, month))
}

/// Parse an amount in 만원 (commas allowed) and convert to 억원.
pub fn parse_amount(value: &Value, row: usize) -> NormalizeResult<f64> {
    let manwon = match value {
        Value::Number(n) => n.as_f64(),
        other => {
            let text = cell_text(other).replace(',', "");
            text.trim().parse::<f64>().ok()
        }
    };

    match manwon {
        Some(v) if v.is_finite() => Ok(v / MANWON_PER_EOK),
        _ => Err(NormalizeError::InvalidAmount {
            row,
            value: cell_text(value),
        }),
    }
}

/// Third whitespace token of a region path (the sub-district), if present.
pub fn sub_district(region: &str) -> Option<&str> {
    region.split_whitespace().nth(2)
}

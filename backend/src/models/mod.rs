//! Domain models for the dealstat reporting pipeline.
//!
//! - [`YearMonth`] - Contract month derived from a `YYYYMM` code
//! - [`PriceBracket`] - Ordered amount brackets (first match wins)
//! - [`Cell`] - A single value in a report table
//! - [`Table`] - A finished pivot/summary table handed to rendering

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Year-Month
// =============================================================================

/// Contract year and month.
///
/// Ordering follows the numeric `year * 100 + month` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Composite code, e.g. `202403`.
    pub fn code(&self) -> i64 {
        i64::from(self.year) * 100 + i64::from(self.month)
    }

    /// Display label, e.g. `2024년 3월`.
    pub fn label(&self) -> String {
        format!("{}년 {}월", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Year column label, e.g. `2024년`.
pub fn year_label(year: i32) -> String {
    format!("{}년", year)
}

/// Month column label, e.g. `3월`.
pub fn month_label(month: u32) -> String {
    format!("{}월", month)
}

// =============================================================================
// Price Brackets
// =============================================================================

/// An amount bracket in 억원 (billion-won scale: 만원 / 10000).
///
/// A value belongs to the first bracket whose `upper` bound it is below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBracket {
    /// Exclusive upper bound
    pub upper: f64,
    pub label: &'static str,
}

/// Brackets in canonical column order.
pub const PRICE_BRACKETS: [PriceBracket; 6] = [
    PriceBracket { upper: 50.0, label: "50억 미만" },
    PriceBracket { upper: 100.0, label: "50~100억 미만" },
    PriceBracket { upper: 200.0, label: "100~200억 미만" },
    PriceBracket { upper: 400.0, label: "200~400억 미만" },
    PriceBracket { upper: 1000.0, label: "400억 이상" },
    PriceBracket { upper: f64::INFINITY, label: "1000억 이상" },
];

impl PriceBracket {
    /// Bracket of an amount; values past every bound land in the last one.
    pub fn classify(amount: f64) -> &'static PriceBracket {
        &PRICE_BRACKETS[Self::position(amount)]
    }

    /// Index of an amount's bracket in [`PRICE_BRACKETS`].
    pub fn position(amount: f64) -> usize {
        PRICE_BRACKETS
            .iter()
            .position(|b| amount < b.upper)
            .unwrap_or(PRICE_BRACKETS.len() - 1)
    }

    /// Labels in canonical order.
    pub fn labels() -> Vec<&'static str> {
        PRICE_BRACKETS.iter().map(|b| b.label).collect()
    }

    /// Human-readable description of the bracket table.
    pub fn describe() -> String {
        let mut lower = None;
        let mut lines = Vec::new();
        for b in &PRICE_BRACKETS {
            let range = match (lower, b.upper.is_finite()) {
                (None, _) => format!("x < {}", b.upper),
                (Some(lo), true) => format!("{} <= x < {}", lo, b.upper),
                (Some(lo), false) => format!("x >= {}", lo),
            };
            lines.push(format!("| {:<20} | {} |", range, b.label));
            lower = Some(b.upper);
        }
        lines.join("\n")
    }
}

// =============================================================================
// Tables
// =============================================================================

/// A single table value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Row label or other text
    Text(String),
    /// Transaction count
    Count(u64),
    /// Derived average; `None` when undefined
    Decimal(Option<f64>),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            Cell::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Cell::Decimal(v) => *v,
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Count(n) => write!(f, "{}", n),
            Cell::Decimal(Some(v)) => write!(f, "{:.2}", v),
            Cell::Decimal(None) => Ok(()),
        }
    }
}

/// A finished table: header row plus data rows, first column is the row label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Short title, used in split output names
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Last data row is a column-wise total
    pub total_row: bool,
    /// 0-based indices of row-wise total columns
    pub total_columns: Vec<usize>,
}

impl Table {
    /// Number of columns including the label column.
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Number of data rows (excluding the header).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Row labels in order.
    pub fn row_labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.first().map(|c| c.to_string()).unwrap_or_default())
            .collect()
    }

    /// Cell at a row label and column header.
    pub fn cell(&self, row_label: &str, column: &str) -> Option<&Cell> {
        let col = self.column(column)?;
        self.rows
            .iter()
            .find(|r| matches!(r.first(), Some(Cell::Text(s)) if s == row_label))
            .and_then(|r| r.get(col))
    }

    /// Count at a row label and column header.
    pub fn count(&self, row_label: &str, column: &str) -> Option<u64> {
        self.cell(row_label, column).and_then(Cell::as_count)
    }
}

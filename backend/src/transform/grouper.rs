//! Group rows into counts and pivot counts into wide tables.
//!
//! # Architecture
//!
//! ```text
//! (row key, column key) pairs      →  CrossTab           →  Table
//! ┌────────────────────────┐          ┌──────────────┐       ┌──────┬─────┬─────┬──────┐
//! │ 역삼동, 2024-03        │          │ 역삼동 → 03:2│       │ 동   │ 3월 │ 4월 │ 합계 │
//! │ 역삼동, 2024-03        │    →     │        04:1  │  →    │ 역삼동│  2  │  1  │  3   │
//! │ 역삼동, 2024-04        │          │ 삼성동 → 04:1│       │ 삼성동│  0  │  1  │  1   │
//! │ 삼성동, 2024-04        │          └──────────────┘       │ 합계 │  2  │  2  │  4   │
//! └────────────────────────┘                                 └──────┴─────┴─────┴──────┘
//! ```
//!
//! Row keys come out in ascending order. Columns are either the observed
//! keys in ascending order or a declared category list; declared categories
//! that never occur are filled with zero.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::TOTAL_LABEL;
use crate::models::{Cell, Table};

/// Counts of `(row, column)` pairs.
#[derive(Debug, Clone)]
pub struct CrossTab<R: Ord, C: Ord> {
    counts: BTreeMap<R, BTreeMap<C, u64>>,
}

impl<R: Ord + Clone, C: Ord + Clone> CrossTab<R, C> {
    pub fn new() -> Self {
        Self { counts: BTreeMap::new() }
    }

    /// Count one occurrence.
    pub fn add(&mut self, row: R, column: C) {
        *self.counts.entry(row).or_default().entry(column).or_insert(0) += 1;
    }

    /// Observed row keys, ascending.
    pub fn row_keys(&self) -> Vec<R> {
        self.counts.keys().cloned().collect()
    }

    /// Observed column keys, ascending.
    pub fn column_keys(&self) -> Vec<C> {
        self.counts
            .values()
            .flat_map(|cols| cols.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Count for a pair, zero when absent.
    pub fn get(&self, row: &R, column: &C) -> u64 {
        self.counts
            .get(row)
            .and_then(|cols| cols.get(column))
            .copied()
            .unwrap_or(0)
    }
}

impl<R: Ord + Clone, C: Ord + Clone> Default for CrossTab<R, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Ord + Clone, C: Ord + Clone> FromIterator<(R, C)> for CrossTab<R, C> {
    fn from_iter<I: IntoIterator<Item = (R, C)>>(iter: I) -> Self {
        let mut tab = Self::new();
        for (row, column) in iter {
            tab.add(row, column);
        }
        tab
    }
}

/// Shape of a pivot table.
#[derive(Debug, Clone)]
pub struct PivotOptions {
    pub name: String,
    /// Header of the label column
    pub index_header: String,
    /// Append a column-wise total row
    pub total_row: bool,
    /// Append a row-wise total column
    pub total_column: bool,
}

/// Pivot `tab` into a wide table.
///
/// Rows follow `rows`, columns follow `columns`; missing pairs are zero.
pub fn pivot<R, C>(
    tab: &CrossTab<R, C>,
    rows: &[R],
    columns: &[C],
    row_label: impl Fn(&R) -> String,
    column_label: impl Fn(&C) -> String,
    options: &PivotOptions,
) -> Table
where
    R: Ord + Clone,
    C: Ord + Clone,
{
    let mut header = Vec::with_capacity(columns.len() + 2);
    header.push(options.index_header.clone());
    header.extend(columns.iter().map(&column_label));
    if options.total_column {
        header.push(TOTAL_LABEL.to_string());
    }

    let mut column_sums = vec![0u64; columns.len()];
    let mut table_rows = Vec::with_capacity(rows.len() + 1);

    for row in rows {
        let counts: Vec<u64> = columns.iter().map(|c| tab.get(row, c)).collect();
        for (sum, n) in column_sums.iter_mut().zip(&counts) {
            *sum += n;
        }
        table_rows.push(count_row(row_label(row), &counts, options.total_column));
    }

    let total_row = options.total_row && !table_rows.is_empty();
    if total_row {
        table_rows.push(count_row(TOTAL_LABEL.to_string(), &column_sums, options.total_column));
    }

    let total_columns = if options.total_column { vec![header.len() - 1] } else { Vec::new() };

    Table {
        name: options.name.clone(),
        header,
        rows: table_rows,
        total_row,
        total_columns,
    }
}

fn count_row(label: String, counts: &[u64], with_total: bool) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(counts.len() + 2);
    cells.push(Cell::Text(label));
    cells.extend(counts.iter().map(|&n| Cell::Count(n)));
    if with_total {
        cells.push(Cell::Count(counts.iter().sum()));
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(total_row: bool, total_column: bool) -> PivotOptions {
        PivotOptions {
            name: "test".into(),
            index_header: "동".into(),
            total_row,
            total_column,
        }
    }

    fn sample() -> CrossTab<String, i64> {
        [("역삼동", 202403), ("역삼동", 202403), ("역삼동", 202404), ("삼성동", 202404), ("개포동", 202312)]
            .into_iter()
            .map(|(r, c)| (r.to_string(), c))
            .collect()
    }

    #[test]
    fn test_crosstab_counts_and_keys() {
        let tab = sample();
        assert_eq!(tab.get(&"역삼동".to_string(), &202403), 2);
        assert_eq!(tab.get(&"삼성동".to_string(), &202403), 0);
        assert_eq!(tab.row_keys(), vec!["개포동", "삼성동", "역삼동"]);
        assert_eq!(tab.column_keys(), vec![202312, 202403, 202404]);
    }

    #[test]
    fn test_pivot_with_totals() {
        let tab = sample();
        let table = pivot(&tab, &tab.row_keys(), &tab.column_keys(), |r| r.clone(), |c| c.to_string(), &options(true, true));

        assert_eq!(table.header, vec!["동", "202312", "202403", "202404", "합계"]);
        assert_eq!(table.row_labels(), vec!["개포동", "삼성동", "역삼동", "합계"]);
        assert_eq!(table.count("역삼동", "합계"), Some(3));
        assert_eq!(table.count("합계", "202404"), Some(2));
        assert_eq!(table.count("합계", "합계"), Some(5));
        assert!(table.total_row);
        assert_eq!(table.total_columns, vec![4]);
    }

    #[test]
    fn test_cross_footing() {
        let tab = sample();
        let table = pivot(&tab, &tab.row_keys(), &tab.column_keys(), |r| r.clone(), |c| c.to_string(), &options(true, true));

        let data_rows = &table.rows[..table.rows.len() - 1];
        let last = table.width() - 1;
        let sum_of_row_totals: u64 = data_rows.iter().filter_map(|r| r[last].as_count()).sum();
        let total_row = table.rows.last().unwrap();
        let sum_of_column_totals: u64 = total_row[1..last].iter().filter_map(Cell::as_count).sum();

        assert_eq!(sum_of_row_totals, sum_of_column_totals);
        assert_eq!(total_row[last].as_count(), Some(sum_of_row_totals));
    }

    #[test]
    fn test_declared_columns_zero_filled() {
        let tab: CrossTab<String, &str> = [("강남구".to_string(), "b")].into_iter().collect();
        let table = pivot(&tab, &tab.row_keys(), &["a", "b", "c"], |r| r.clone(), |c| c.to_string(), &options(false, false));

        assert_eq!(table.header, vec!["동", "a", "b", "c"]);
        assert_eq!(table.count("강남구", "a"), Some(0));
        assert_eq!(table.count("강남구", "b"), Some(1));
        assert!(!table.total_row);
        assert!(table.total_columns.is_empty());
    }

    #[test]
    fn test_empty_input_has_no_total_row() {
        let tab: CrossTab<String, i64> = CrossTab::new();
        let table = pivot(&tab, &[], &[], |r| r.clone(), |c| c.to_string(), &options(true, true));
        assert!(table.is_empty());
        assert!(!table.total_row);
        assert_eq!(table.header, vec!["동", "합계"]);
    }
}

//! The three analyses built from a combined row-set.
//!
//! - District report: sub-district × month, sub-district × year, and a
//!   year-month summary, for rows inside the target district.
//! - Price-bracket report: district × bracket for a fixed set of districts.
//! - City summary: year × month counts with annual total and averages.

use serde::Serialize;

use super::grouper::{pivot, CrossTab, PivotOptions};
use super::normalize::{sub_district, Normalizer};
use crate::config::ReportConfig;
use crate::error::NormalizeResult;
use crate::models::{month_label, year_label, Cell, PriceBracket, Table, YearMonth};
use crate::parser::RowSet;

/// Index header of sub-district tables.
pub const SUB_DISTRICT_HEADER: &str = "동";
/// Index header of district tables.
pub const DISTRICT_HEADER: &str = "구";
/// Index header of summary tables.
pub const YEAR_HEADER: &str = "년도";
pub const ANNUAL_TOTAL_LABEL: &str = "연간합계";
pub const AVERAGE_PER_YEAR_LABEL: &str = "월평균(12개월)";
pub const AVERAGE_PER_ACTIVE_LABEL: &str = "월평균(거래월)";

/// Tables of the district report, in output order.
#[derive(Debug, Clone, Serialize)]
pub struct DistrictReport {
    pub monthly: Table,
    pub yearly: Table,
    pub summary: Table,
}

impl DistrictReport {
    pub fn into_tables(self) -> Vec<Table> {
        vec![self.monthly, self.yearly, self.summary]
    }
}

/// Sub-district × month and × year tables for rows inside the target district.
///
/// Rows whose region has no sub-district token are left out of both pivots
/// but still count in the year-month summary.
pub fn district_report(
    rows: &RowSet,
    config: &ReportConfig,
    normalizer: &Normalizer,
) -> NormalizeResult<DistrictReport> {
    let mut by_month: CrossTab<String, YearMonth> = CrossTab::new();
    let mut by_year: CrossTab<String, i32> = CrossTab::new();
    let mut months = Vec::new();

    for (idx, record) in rows.records.iter().enumerate() {
        let row = idx + 1;
        let region = normalizer.region(record, row)?;
        if !region.contains(config.target_district.as_str()) {
            continue;
        }

        let ym = normalizer.year_month(record, row)?;
        months.push(ym);

        if let Some(dong) = sub_district(&region) {
            by_month.add(dong.to_string(), ym);
            by_year.add(dong.to_string(), ym.year);
        }
    }

    let monthly = pivot(
        &by_month,
        &by_month.row_keys(),
        &by_month.column_keys(),
        |dong| dong.clone(),
        YearMonth::label,
        &PivotOptions {
            name: "동별 월별".to_string(),
            index_header: SUB_DISTRICT_HEADER.to_string(),
            total_row: config.monthly_total_row,
            total_column: config.monthly_total_column,
        },
    );

    let yearly = pivot(
        &by_year,
        &by_year.row_keys(),
        &by_year.column_keys(),
        |dong| dong.clone(),
        |year| year_label(*year),
        &PivotOptions {
            name: "동별 년도별".to_string(),
            index_header: SUB_DISTRICT_HEADER.to_string(),
            total_row: config.yearly_total_row,
            total_column: config.yearly_total_column,
        },
    );

    let summary = year_month_summary("연도별 월별", months, config.fill_missing_years);

    Ok(DistrictReport { monthly, yearly, summary })
}

/// District × price-bracket table over the configured districts.
///
/// Every row's amount is parsed, so one bad amount anywhere fails the report.
pub fn bracket_report(
    rows: &RowSet,
    config: &ReportConfig,
    normalizer: &Normalizer,
) -> NormalizeResult<Table> {
    let mut tab: CrossTab<String, usize> = CrossTab::new();

    for (idx, record) in rows.records.iter().enumerate() {
        let row = idx + 1;
        let amount = normalizer.amount(record, row)?;
        let region = normalizer.region(record, row)?;

        let Some(district) = normalizer.prefixed_district(&region) else {
            continue;
        };
        if !config.bracket_districts.contains(&district) {
            continue;
        }

        tab.add(district, PriceBracket::position(amount));
    }

    let labels = PriceBracket::labels();
    let columns: Vec<usize> = (0..labels.len()).collect();

    Ok(pivot(
        &tab,
        &tab.row_keys(),
        &columns,
        |district| district.clone(),
        |position| labels[*position].to_string(),
        &PivotOptions {
            name: "금액대별".to_string(),
            index_header: DISTRICT_HEADER.to_string(),
            total_row: config.bracket_total_row,
            total_column: config.bracket_total_column,
        },
    ))
}

/// Year × month summary over every row, or rows matching `summary_filter`.
pub fn city_summary(
    rows: &RowSet,
    config: &ReportConfig,
    normalizer: &Normalizer,
) -> NormalizeResult<Table> {
    let mut months = Vec::with_capacity(rows.len());

    for (idx, record) in rows.records.iter().enumerate() {
        let row = idx + 1;
        if let Some(filter) = &config.summary_filter {
            if !normalizer.region(record, row)?.contains(filter.as_str()) {
                continue;
            }
        }
        months.push(normalizer.year_month(record, row)?);
    }

    Ok(year_month_summary("연도별 월별", months, config.fill_missing_years))
}

/// One row per year: twelve month counts, annual total and two averages.
///
/// All twelve months are always present. The per-active-month average is
/// empty for a year without transactions.
pub fn year_month_summary(
    name: &str,
    months: impl IntoIterator<Item = YearMonth>,
    fill_missing_years: bool,
) -> Table {
    let tab: CrossTab<i32, u32> = months.into_iter().map(|ym| (ym.year, ym.month)).collect();

    let mut years = tab.row_keys();
    if fill_missing_years {
        if let (Some(&first), Some(&last)) = (years.first(), years.last()) {
            years = (first..=last).collect();
        }
    }

    let mut header = vec![YEAR_HEADER.to_string()];
    header.extend((1..=12).map(month_label));
    header.extend([ANNUAL_TOTAL_LABEL, AVERAGE_PER_YEAR_LABEL, AVERAGE_PER_ACTIVE_LABEL].map(String::from));

    let rows = years
        .iter()
        .map(|year| {
            let counts: Vec<u64> = (1..=12).map(|m| tab.get(year, &m)).collect();
            summary_row(year_label(*year), &counts)
        })
        .collect();

    Table {
        name: name.to_string(),
        header,
        rows,
        total_row: false,
        total_columns: Vec::new(),
    }
}

fn summary_row(label: String, counts: &[u64]) -> Vec<Cell> {
    let total: u64 = counts.iter().sum();
    let active = counts.iter().filter(|&&n| n > 0).count();

    let mut cells = vec![Cell::Text(label)];
    cells.extend(counts.iter().map(|&n| Cell::Count(n)));
    cells.push(Cell::Count(total));
    cells.push(Cell::Decimal(Some(round2(total as f64 / 12.0))));
    cells.push(Cell::Decimal((active > 0).then(|| round2(total as f64 / active as f64))));
    cells
}

/// Round to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

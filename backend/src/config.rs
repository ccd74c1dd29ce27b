//! Report configuration.
//!
//! Every column name, district list and layout constant used by the analyses
//! lives here. Values come from [`ReportConfig::default`], optionally a JSON
//! file, then the environment (`DEALSTAT_OUTPUT_DIR`, `.env` honoured).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Environment variable overriding [`ReportConfig::output_dir`].
pub const OUTPUT_DIR_ENV: &str = "DEALSTAT_OUTPUT_DIR";

/// Label used for total rows and columns.
pub const TOTAL_LABEL: &str = "합계";

/// Configuration shared by all analyses of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Region path column; also the marker used to find the header row
    pub region_column: String,

    /// Contract year-month column (YYYYMM)
    pub year_month_column: String,

    /// Amount column in 만원 units
    pub amount_column: String,

    /// District analysed by the district report
    pub target_district: String,

    /// City prefix anchoring district extraction for the bracket report
    pub bracket_city_prefix: String,

    /// Districts kept by the bracket report, in no particular order
    pub bracket_districts: Vec<String>,

    /// Substring filter for the city summary (None = every row)
    pub summary_filter: Option<String>,

    /// Sheet names of the bracket report and the city summary
    pub bracket_sheet: String,
    pub summary_sheet: String,

    pub monthly_total_row: bool,
    pub monthly_total_column: bool,
    pub yearly_total_row: bool,
    pub yearly_total_column: bool,
    pub bracket_total_row: bool,
    pub bracket_total_column: bool,

    /// Emit zero rows for years missing between the first and last observed year
    pub fill_missing_years: bool,

    /// Row offset between the end of one stacked table and the next
    pub table_gap: usize,

    /// Label of the combined report in output names
    pub batch_label: String,

    /// Directory receiving output units
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            region_column: "시군구".to_string(),
            year_month_column: "계약년월".to_string(),
            amount_column: "거래금액(만원)".to_string(),
            target_district: "강남구".to_string(),
            bracket_city_prefix: "서울특별시".to_string(),
            bracket_districts: ["강남구", "성동구", "종로구", "중구", "용산구", "마포구"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            summary_filter: None,
            bracket_sheet: "금액대별".to_string(),
            summary_sheet: "서울시".to_string(),
            monthly_total_row: true,
            monthly_total_column: true,
            yearly_total_row: false,
            yearly_total_column: false,
            bracket_total_row: true,
            bracket_total_column: true,
            fill_missing_years: false,
            table_gap: 2,
            batch_label: "실거래가_분석결과".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ReportConfig {
    /// Load a config from a JSON file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        self
    }

    /// Regex capturing the district that follows the configured city prefix.
    pub fn district_pattern(&self) -> ConfigResult<Regex> {
        let pattern = format!(r"{} (\S+구)", regex::escape(&self.bracket_city_prefix));
        Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.region_column, "시군구");
        assert_eq!(config.bracket_districts.len(), 6);
        assert!(config.monthly_total_row);
        assert!(!config.yearly_total_row);
        assert_eq!(config.table_gap, 2);
        assert_eq!(config.bracket_sheet, "금액대별");
        assert_eq!(config.summary_sheet, "서울시");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ReportConfig::from_json(r#"{"target_district": "서초구", "table_gap": 3}"#).unwrap();
        assert_eq!(config.target_district, "서초구");
        assert_eq!(config.table_gap, 3);
        assert_eq!(config.amount_column, "거래금액(만원)");
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let config = ReportConfig::default();
        let parsed = ReportConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_district_pattern() {
        let re = ReportConfig::default().district_pattern().unwrap();
        let caps = re.captures("서울특별시 강남구 역삼동").unwrap();
        assert_eq!(&caps[1], "강남구");
        assert!(re.captures("경기도 성남시 분당구").is_none());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(ReportConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}

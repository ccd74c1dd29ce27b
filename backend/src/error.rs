//! Error types for the dealstat reporting pipeline.
//!
//! One enum per stage:
//!
//! - [`LoadError`] - reading spreadsheets and resolving header rows
//! - [`NormalizeError`] - deriving typed fields from raw cells
//! - [`RenderError`] - persisting assembled reports
//! - [`ConfigError`] - loading report configuration
//! - [`RunError`] - top-level run orchestration
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across stage boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading an input file into rows.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// File extension is not a known tabular format.
    #[error("Unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    /// Spreadsheet could not be opened or read.
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Delimited text could not be parsed.
    #[error("Invalid CSV: {0}")]
    Csv(String),

    /// Bytes could not be decoded.
    #[error("Failed to decode file: {0}")]
    Encoding(String),

    /// File contains no rows at all.
    #[error("File is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    /// No row in the file contains the marker column.
    #[error("Header row not found in {}: no row contains '{marker}'", .path.display())]
    HeaderNotFound { path: PathBuf, marker: String },
}

// =============================================================================
// Normalization Errors
// =============================================================================

/// Errors while deriving typed fields from a transaction row.
///
/// `row` is the 1-based position in the combined row-set.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Column absent or empty in a row.
    #[error("Row {row}: missing value for column '{column}'")]
    MissingColumn { row: usize, column: String },

    /// Year-month is not a 6-digit YYYYMM code.
    #[error("Row {row}: invalid year-month '{value}' (expected YYYYMM)")]
    InvalidYearMonth { row: usize, value: String },

    /// Month digits outside 1-12.
    #[error("Row {row}: month {month} is out of range 1-12")]
    MonthOutOfRange { row: usize, month: u32 },

    /// Amount is not a number.
    #[error("Row {row}: invalid amount '{value}'")]
    InvalidAmount { row: usize, value: String },
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors while persisting an output unit.
#[derive(Debug, Error)]
pub enum RenderError {
    /// IO error.
    #[error("Render IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error.
    #[error("Render JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Workbook writer error.
    #[error("Workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while loading a [`crate::config::ReportConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured value produced an invalid pattern.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

// =============================================================================
// Run Errors (top-level)
// =============================================================================

/// Top-level run errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`]. Its `Display`
/// output is the single message shown to the user when a run aborts.
#[derive(Debug, Error)]
pub enum RunError {
    /// No input files were given.
    #[error("No input files selected")]
    NoInputFiles,

    /// Every analysis flag was off.
    #[error("Select at least one analysis")]
    NoAnalysisSelected,

    /// Loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Normalization error.
    #[error("Data error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Rendering error.
    #[error("Output error: {0}")]
    Render(#[from] RenderError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for normalization.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for whole runs.
pub type RunResult<T> = Result<T, RunError>;

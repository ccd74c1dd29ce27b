//! # Dealstat - real-estate transaction reports
//!
//! Dealstat reads exported transaction spreadsheets (header rows anywhere
//! below a title block), counts transactions per region and period, and
//! writes pivot tables with the layout metadata a styling step needs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ xlsx / csv  │────▶│   Parser    │────▶│  Transform  │────▶│   Report    │
//! │  (N files)  │     │ (find head) │     │ (pivots)    │     │ (placement) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dealstat::{run, AnalysisSelection, ReportConfig, RunRequest};
//! use dealstat::XlsxRenderer;
//!
//! let request = RunRequest::new(vec!["deals.xlsx".into()], AnalysisSelection::all());
//! let outcome = run(&request, &ReportConfig::default(), &mut XlsxRenderer).unwrap();
//! println!("Wrote {:?}", outcome.outputs);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Column names, districts and layout settings
//! - [`logs`] - Run log
//! - [`models`] - Year-months, price brackets and tables
//! - [`parser`] - Header-resolving spreadsheet loader
//! - [`transform`] - Normalization, pivots, analyses and the run entry point
//! - [`report`] - Placement and rendering

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Loading
pub mod parser;

// Analysis
pub mod transform;

// Output
pub mod report;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConfigError, LoadError, NormalizeError, RenderError, RunError, RunResult,
};

// =============================================================================
// Re-exports - Config & Models
// =============================================================================

pub use config::ReportConfig;
pub use models::{Cell, PriceBracket, Table, YearMonth, PRICE_BRACKETS};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{load_file, load_files, LoadedFile, RowSet};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_sections, run, run_at, AnalysisSelection, RunOutcome, RunRequest,
};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::render::{CsvRenderer, JsonRenderer, OutputFormat, Renderer};
pub use report::xlsx::XlsxRenderer;
pub use report::{LayoutStrategy, OutputUnit, Placement};

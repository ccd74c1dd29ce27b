//! Transformation module.
//!
//! Turns the combined row-set into report tables:
//! - Normalize: typed fields from raw cells
//! - Grouper: cross-tab counting and pivoting
//! - Analysis: the district, price-bracket and city reports
//! - Pipeline: the run entry point

pub mod analysis;
pub mod grouper;
pub mod normalize;
pub mod pipeline;

pub use analysis::{bracket_report, city_summary, district_report, year_month_summary, DistrictReport};
pub use grouper::{pivot, CrossTab, PivotOptions};
pub use normalize::Normalizer;
pub use pipeline::*;

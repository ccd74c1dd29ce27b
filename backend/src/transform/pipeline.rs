//! Run entry point: load, analyse, assemble, render.
//!
//! # Example
//!
//! ```rust,ignore
//! use dealstat::{run, AnalysisSelection, ReportConfig, RunRequest};
//! use dealstat::report::render::CsvRenderer;
//!
//! let request = RunRequest::new(vec!["2024.xlsx".into()], AnalysisSelection::all());
//! let outcome = run(&request, &ReportConfig::default(), &mut CsvRenderer)?;
//! println!("Wrote {} output(s)", outcome.outputs.len());
//! ```

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::analysis::{bracket_report, city_summary, district_report};
use super::normalize::Normalizer;
use crate::config::ReportConfig;
use crate::error::{RunError, RunResult};
use crate::logs::{log_info, log_info_indent, log_success, LogEntry, RUN_LOG};
use crate::models::Table;
use crate::parser::{load_files, RowSet};
use crate::report::render::Renderer;
use crate::report::{assemble, format_timestamp, LayoutStrategy, Section};

/// Which analyses a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisSelection {
    /// Sub-district report for the target district
    pub district: bool,
    /// District × price-bracket report
    pub brackets: bool,
    /// City-wide year × month summary
    pub city_summary: bool,
}

impl AnalysisSelection {
    pub fn all() -> Self {
        Self { district: true, brackets: true, city_summary: true }
    }

    pub fn any(&self) -> bool {
        self.district || self.brackets || self.city_summary
    }
}

/// Immutable input of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub inputs: Vec<PathBuf>,
    pub analyses: AnalysisSelection,
    pub layout: LayoutStrategy,
}

impl RunRequest {
    pub fn new(inputs: Vec<PathBuf>, analyses: AnalysisSelection) -> Self {
        Self { inputs, analyses, layout: LayoutStrategy::default() }
    }

    pub fn with_layout(mut self, layout: LayoutStrategy) -> Self {
        self.layout = layout;
        self
    }

    /// Reject requests that cannot produce anything.
    pub fn validate(&self) -> RunResult<()> {
        if self.inputs.is_empty() {
            return Err(RunError::NoInputFiles);
        }
        if !self.analyses.any() {
            return Err(RunError::NoAnalysisSelected);
        }
        Ok(())
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Paths written, in output order
    pub outputs: Vec<PathBuf>,
    /// Rows in the combined row-set
    pub row_count: usize,
    /// Every table produced, in output order
    pub tables: Vec<Table>,
    /// Log entries recorded during the run
    pub logs: Vec<LogEntry>,
}

/// Run the selected analyses over `request.inputs`.
///
/// The output timestamp is the local time at the start of the write phase.
pub fn run(
    request: &RunRequest,
    config: &ReportConfig,
    renderer: &mut dyn Renderer,
) -> RunResult<RunOutcome> {
    run_at(request, config, renderer, None)
}

/// Same as [`run`], with an explicit output timestamp when given.
pub fn run_at(
    request: &RunRequest,
    config: &ReportConfig,
    renderer: &mut dyn Renderer,
    timestamp: Option<NaiveDateTime>,
) -> RunResult<RunOutcome> {
    request.validate()?;
    let normalizer = Normalizer::new(config)?;

    // Entries left over from earlier activity do not belong to this run
    RUN_LOG.take_entries();

    log_info(format!("📖 Loading {} file(s)...", request.inputs.len()));
    let rows = load_files(&request.inputs, &config.region_column)?;

    log_info("⚙️  Building tables...");
    let sections = build_sections(&rows, &request.analyses, config, &normalizer)?;
    let tables: Vec<Table> = sections
        .iter()
        .flat_map(|section| section.tables.iter().cloned())
        .collect();
    for table in &tables {
        log_info_indent(format!("{}: {} rows", table.name, table.len()), 1);
    }

    let stamp = format_timestamp(&timestamp.unwrap_or_else(|| Local::now().naive_local()));
    let units = assemble(sections, request.layout, &stamp, &config.batch_label, config.table_gap);

    let mut outputs = Vec::with_capacity(units.len());
    for unit in &units {
        let path = renderer.render(unit, &config.output_dir)?;
        log_success(format!("💾 Saved {}", path.display()));
        outputs.push(path);
    }

    Ok(RunOutcome {
        outputs,
        row_count: rows.len(),
        tables,
        logs: RUN_LOG.take_entries(),
    })
}

/// Tables of every selected analysis, one section per sheet.
pub fn build_sections(
    rows: &RowSet,
    analyses: &AnalysisSelection,
    config: &ReportConfig,
    normalizer: &Normalizer,
) -> RunResult<Vec<Section>> {
    let mut sections = Vec::new();

    if analyses.district {
        let report = district_report(rows, config, normalizer)?;
        sections.push(Section {
            sheet: config.target_district.clone(),
            tables: report.into_tables(),
        });
    }

    if analyses.brackets {
        sections.push(Section {
            sheet: config.bracket_sheet.clone(),
            tables: vec![bracket_report(rows, config, normalizer)?],
        });
    }

    if analyses.city_summary {
        sections.push(Section {
            sheet: config.summary_sheet.clone(),
            tables: vec![city_summary(rows, config, normalizer)?],
        });
    }

    Ok(sections)
}

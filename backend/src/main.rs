//! Dealstat CLI - transaction count reports from spreadsheet exports
//!
//! # Main Commands
//!
//! ```bash
//! dealstat run a.xlsx b.xlsx -a -b -c     # All three analyses, stacked
//! dealstat run a.csv -c --layout split    # One output per table
//! dealstat load a.xlsx -o rows.json       # Dump the combined rows
//! ```
//!
//! # Reference Commands
//!
//! ```bash
//! dealstat brackets                       # Show the price-bracket table
//! dealstat example-config                 # Show the default config
//! ```

use clap::{Parser, Subcommand};
use dealstat::logs::{log_error, LogLevel, RUN_LOG};
use dealstat::{
    load_files, run, AnalysisSelection, LayoutStrategy, OutputFormat, PriceBracket,
    ReportConfig, RunRequest,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dealstat")]
#[command(about = "Count real-estate transactions by region and period", long_about = None)]
struct Cli {
    /// Do not echo progress to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run analyses over one or more spreadsheets
    Run {
        /// Input files (.xlsx, .xls, .ods, .csv, .tsv)
        files: Vec<PathBuf>,

        /// Sub-district report for the target district
        #[arg(short = 'a', long)]
        district: bool,

        /// District × price-bracket report
        #[arg(short = 'b', long)]
        brackets: bool,

        /// City-wide year × month summary
        #[arg(short = 'c', long)]
        summary: bool,

        /// Table distribution over outputs
        #[arg(long, value_enum, default_value = "stacked")]
        layout: LayoutStrategy,

        /// Output format
        #[arg(long, value_enum, default_value = "xlsx")]
        format: OutputFormat,

        /// Output directory (overrides config and DEALSTAT_OUTPUT_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load spreadsheets and output the combined rows as JSON
    Load {
        /// Input files
        files: Vec<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the price-bracket table
    Brackets,

    /// Show the default configuration
    ExampleConfig,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    RUN_LOG.set_echo(!cli.quiet);

    let result = match cli.command {
        Commands::Run {
            files,
            district,
            brackets,
            summary,
            layout,
            format,
            output,
            config,
        } => {
            let analyses = AnalysisSelection {
                district,
                brackets,
                city_summary: summary,
            };
            cmd_run(files, analyses, layout, format, output, config.as_deref())
        }

        Commands::Load { files, output, config } => {
            cmd_load(&files, output.as_deref(), config.as_deref())
        }

        Commands::Brackets => cmd_brackets(),

        Commands::ExampleConfig => cmd_example_config(),
    };

    if let Err(e) = result {
        RUN_LOG.set_echo(true);
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(p) => ReportConfig::from_file(p)?,
        None => ReportConfig::default(),
    };
    Ok(config.with_env())
}

fn cmd_run(
    files: Vec<PathBuf>,
    analyses: AnalysisSelection,
    layout: LayoutStrategy,
    format: OutputFormat,
    output: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = output {
        config.output_dir = dir;
    }

    let request = RunRequest {
        inputs: files,
        analyses,
        layout,
    };
    let mut renderer = format.renderer();
    let outcome = run(&request, &config, renderer.as_mut())?;

    let warnings = outcome
        .logs
        .iter()
        .filter(|e| e.level == LogLevel::Warning)
        .count();
    eprintln!(
        "\n📊 {} rows, {} tables, {} warning(s)",
        outcome.row_count,
        outcome.tables.len(),
        warnings
    );
    for path in &outcome.outputs {
        println!("{}", path.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_load(
    files: &[PathBuf],
    output: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        return Err(dealstat::RunError::NoInputFiles.into());
    }

    let config = load_config(config_path)?;
    let rows = load_files(files, &config.region_column)?;
    eprintln!("   Columns: {}", rows.columns.join(", "));

    let json = serde_json::to_string_pretty(&rows.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_brackets() -> Result<(), Box<dyn std::error::Error>> {
    println!("Amounts in 억원 (거래금액(만원) / 10000)\n");
    println!("{}", PriceBracket::describe());
    Ok(())
}

fn cmd_example_config() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", ReportConfig::default().to_json()?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

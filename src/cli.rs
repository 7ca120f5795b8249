//! CLI interface for meterstat
//!
//! This module defines the command-line interface using clap. Every command
//! reads the same data directory; when no command is given, the full campus
//! report is printed.
//!
//! # Example
//!
//! ```bash
//! # Full campus report from ./data
//! meterstat
//!
//! # Weekly totals with Sunday-start weeks, as JSON
//! meterstat weekly --start-of-week sunday --json
//!
//! # Write cleaned data, summary CSV and summary.txt into ./out
//! meterstat --data-dir readings export --output-dir out
//! ```

use crate::types::WeekStart;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Aggregate building electricity meter readings
#[derive(Parser, Debug, Clone)]
#[command(name = "meterstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory containing meter CSV files
    #[arg(long, short = 'd', env = "METERSTAT_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Day weekly buckets start on (monday or sunday)
    #[arg(long, default_value = "monday", global = true)]
    pub start_of_week: WeekStart,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The command to run, defaulting to the full report
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Report(ReportArgs::default()))
    }
}

// ---------------------------------------------------------------------------
// Argument structs
// ---------------------------------------------------------------------------

/// Arguments for the campus report
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Leave out the per-building report lines
    #[arg(long)]
    pub no_building_reports: bool,
}

/// Arguments for the weekly table
#[derive(Args, Debug, Clone, Default)]
pub struct WeeklyArgs {
    /// Show the mean weekly total per building instead of every week
    #[arg(long, short = 'a')]
    pub average: bool,
}

/// Arguments for the export command
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Directory to write exported files into
    #[arg(long, short = 'o', env = "METERSTAT_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Full campus report (default)
    Report(ReportArgs),

    /// Daily totals per building
    Daily,

    /// Weekly totals per building
    Weekly(WeeklyArgs),

    /// Sum, mean, min and max per building
    Summary,

    /// Peak reading per building and across the campus
    Peaks,

    /// One report line per building
    Buildings,

    /// Export cleaned data, building summary and report files
    Export(ExportArgs),
}

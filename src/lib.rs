//! meterstat - Aggregate building electricity meter readings from CSV files
//!
//! This library provides functionality to:
//! - Load and validate meter readings from a directory of CSV files
//! - Sum readings into daily and weekly buckets per building
//! - Compute per-building summaries and peak readings
//! - Keep an incremental per-building ledger with one-line reports
//! - Render reports in table and JSON formats and export them to files
//!
//! # Examples
//!
//! ```no_run
//! use meterstat::{
//!     aggregation::{AggregationConfig, Aggregator},
//!     data_loader::DataLoader,
//!     ledger::BuildingLedger,
//!     types::WeekStart,
//! };
//!
//! fn main() -> meterstat::Result<()> {
//!     // Load every CSV file in ./data
//!     let records = DataLoader::new("data")?.load_records()?.records;
//!
//!     // Weekly totals with Sunday-start weeks
//!     let config = AggregationConfig::default().with_week_start(WeekStart::Sunday);
//!     let weekly = Aggregator::new(config).aggregate_weekly(&records);
//!     println!("{} weekly buckets", weekly.len());
//!
//!     // Per-building report lines
//!     for line in BuildingLedger::from_records(&records).generate_all_reports() {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod data_loader;
pub mod export;
pub mod ledger;
pub mod output;

pub use meterstat_core::{aggregation_types, error, stats, types};

// Re-export commonly used types
pub use error::{MeterstatError, Result};
pub use types::{BuildingName, DailyDate, MeterRecord, Reading, ReadingTime, WeekStart};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

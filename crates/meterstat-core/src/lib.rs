//! Core types, errors, and the shared consumption reduction for meterstat
//!
//! This crate provides the foundational types used by the meterstat
//! aggregation engine: building and timestamp types, the normalized
//! [`MeterRecord`], the aggregate output rows, and [`ConsumptionStats`],
//! the one accumulator every total, summary and peak is derived from.

pub mod aggregation_types;
pub mod error;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{MeterstatError, Result};
pub use stats::ConsumptionStats;
pub use types::{
    BuildingName, DailyDate, Granularity, MeterRecord, Reading, ReadingTime, WeekStart,
};

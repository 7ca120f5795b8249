//! Error types for meterstat
//!
//! This module defines the error types used throughout the meterstat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use meterstat_core::error::{MeterstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to MeterstatError
//!     let _file = std::fs::read_to_string("nonexistent.csv")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::BuildingName;

/// Main error type for meterstat operations
///
/// Covers the aggregation core (timestamps, energy values, empty inputs) as
/// well as the ingestion, export and CLI layers around it.
#[derive(Error, Debug)]
pub enum MeterstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A timestamp could not be parsed into an instant
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An energy value was negative, non-finite or not a number
    #[error("Invalid energy value: {0}")]
    InvalidEnergy(String),

    /// A per-building computation was requested for a building with no readings
    #[error("Building '{0}' has no readings")]
    EmptyEntity(BuildingName),

    /// A dataset-wide computation was requested over zero readings
    #[error("No meter readings available; cannot compute campus statistics")]
    EmptyDataset,

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in meterstat
///
/// # Example
///
/// ```
/// use meterstat_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, MeterstatError>;

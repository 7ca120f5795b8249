//! Data loader module for discovering and parsing meter CSV files
//!
//! This module is the record normalizer in front of the aggregation core. It
//! finds `*.csv` files in a data directory, reads them with the `csv` crate,
//! and turns every well-formed row into a [`MeterRecord`].
//!
//! # Input format
//!
//! Each file needs a `Timestamp` and a `kWh` column. A `Building` column is
//! optional; files without one use their file stem as the building name, so
//! `data/Library.csv` contributes readings for `Library`. Column names match
//! exactly.
//!
//! Files that cannot be opened or lack the required columns are skipped with
//! a warning. Rows with the wrong number of fields, an empty building, an
//! unparsable timestamp, or a non-numeric / negative kWh value are skipped
//! with a warning as well; one bad row never stops ingestion.
//!
//! The combined records are stably sorted by timestamp.
//!
//! # Examples
//!
//! ```no_run
//! use meterstat::data_loader::DataLoader;
//!
//! # fn example() -> meterstat::Result<()> {
//! let loader = DataLoader::new("data")?;
//! let loaded = loader.load_records()?;
//! println!(
//!     "{} readings from {} files ({} rows skipped)",
//!     loaded.records.len(),
//!     loaded.files_read,
//!     loaded.rows_skipped
//! );
//! # Ok(())
//! # }
//! ```

use crate::error::{MeterstatError, Result};
use crate::types::MeterRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Column holding the building name
pub const BUILDING_COLUMN: &str = "Building";
/// Column holding the reading timestamp
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
/// Column holding the energy value
pub const ENERGY_COLUMN: &str = "kWh";

/// Records loaded from a data directory, with skip counters
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    /// Valid records sorted by timestamp
    pub records: Vec<MeterRecord>,
    /// Files that contributed rows
    pub files_read: usize,
    /// Files that were unreadable or lacked required columns
    pub files_skipped: usize,
    /// Malformed rows dropped across all files
    pub rows_skipped: usize,
}

/// Rows parsed from a single file
#[derive(Debug, Clone, Default)]
pub struct FileRecords {
    pub records: Vec<MeterRecord>,
    pub rows_skipped: usize,
}

/// Column positions resolved from a header row
struct ColumnLayout {
    building: Option<usize>,
    timestamp: usize,
    energy: usize,
    width: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Option<Self> {
        let position = |name: &str| headers.iter().position(|header| header == name);
        Some(Self {
            building: position(BUILDING_COLUMN),
            timestamp: position(TIMESTAMP_COLUMN)?,
            energy: position(ENERGY_COLUMN)?,
            width: headers.len(),
        })
    }
}

/// Data loader for discovering and parsing meter CSV files
pub struct DataLoader {
    data_dir: PathBuf,
    show_progress: bool,
}

impl DataLoader {
    /// Create a loader for a data directory
    ///
    /// # Errors
    ///
    /// Returns [`MeterstatError::Config`] if the path does not exist or is not
    /// a directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        if !data_dir.is_dir() {
            return Err(MeterstatError::Config(format!(
                "Data directory not found: {}",
                data_dir.display()
            )));
        }

        debug!("Using data directory {}", data_dir.display());
        Ok(Self {
            data_dir,
            show_progress: false,
        })
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The directory being scanned
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Find the CSV files directly inside the data directory, sorted by path
    pub fn find_csv_files(&self) -> Vec<PathBuf> {
        let mut csv_files: Vec<PathBuf> = walkdir::WalkDir::new(&self.data_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .collect();
        csv_files.sort();

        debug!("Found {} CSV files", csv_files.len());
        csv_files
    }

    /// Parse one CSV file
    ///
    /// Returns `Ok(None)` when the file lacks the `Timestamp` or `kWh` column.
    ///
    /// # Errors
    ///
    /// Returns [`MeterstatError::Parse`] if the file cannot be opened or its
    /// header row cannot be read.
    pub fn parse_file(path: &Path) -> Result<Option<FileRecords>> {
        let parse_error = |e: csv::Error| MeterstatError::Parse {
            file: path.to_path_buf(),
            error: e.to_string(),
        };

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(parse_error)?;

        let headers = reader.headers().map_err(parse_error)?.clone();
        let Some(layout) = ColumnLayout::from_headers(&headers) else {
            warn!(
                "Skipping {}: missing '{}' or '{}' column",
                path.display(),
                TIMESTAMP_COLUMN,
                ENERGY_COLUMN
            );
            return Ok(None);
        };

        let fallback_building = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();

        let mut parsed = FileRecords::default();
        for (index, row) in reader.records().enumerate() {
            // Header is line 1
            let line = index + 2;
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping {} line {}: {}", path.display(), line, e);
                    parsed.rows_skipped += 1;
                    continue;
                }
            };

            match Self::parse_row(&row, &layout, &fallback_building) {
                Ok(record) => parsed.records.push(record),
                Err(e) => {
                    warn!("Skipping {} line {}: {}", path.display(), line, e);
                    parsed.rows_skipped += 1;
                }
            }
        }

        debug!(
            "Parsed {} rows from {} ({} skipped)",
            parsed.records.len(),
            path.display(),
            parsed.rows_skipped
        );
        Ok(Some(parsed))
    }

    fn parse_row(
        row: &StringRecord,
        layout: &ColumnLayout,
        fallback_building: &str,
    ) -> Result<MeterRecord> {
        if row.len() != layout.width {
            return Err(MeterstatError::InvalidArgument(format!(
                "expected {} fields, found {}",
                layout.width,
                row.len()
            )));
        }

        let building = match layout.building {
            Some(position) => row.get(position).unwrap_or_default(),
            None => fallback_building,
        };
        let timestamp = row.get(layout.timestamp).unwrap_or_default();
        let energy = row.get(layout.energy).unwrap_or_default();

        MeterRecord::from_raw(building, timestamp, energy)
    }

    /// Load and normalize every CSV file in the data directory
    ///
    /// # Errors
    ///
    /// Only fails if the directory listing itself is unusable; individual
    /// file and row problems are logged and counted instead.
    pub fn load_records(&self) -> Result<LoadedData> {
        let files = self.find_csv_files();
        if files.is_empty() {
            warn!("No CSV files found in {}", self.data_dir.display());
        }

        let progress = if self.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            let template = "{spinner:.green} {msg} [{bar:30}] {pos}/{len} files";
            if let Ok(style) = ProgressStyle::default_bar().template(template) {
                pb.set_style(style);
            }
            pb.set_message("Loading meter data");
            Some(pb)
        } else {
            None
        };

        let mut loaded = LoadedData::default();
        for path in &files {
            match Self::parse_file(path) {
                Ok(Some(parsed)) => {
                    loaded.files_read += 1;
                    loaded.rows_skipped += parsed.rows_skipped;
                    loaded.records.extend(parsed.records);
                }
                Ok(None) => loaded.files_skipped += 1,
                Err(e) => {
                    warn!("Error reading {}: {}", path.display(), e);
                    loaded.files_skipped += 1;
                }
            }

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        loaded.records.sort_by_key(|record| record.timestamp);

        info!(
            "Loaded {} readings from {} files ({} files skipped, {} rows skipped)",
            loaded.records.len(),
            loaded.files_read,
            loaded.files_skipped,
            loaded.rows_skipped
        );
        Ok(loaded)
    }
}

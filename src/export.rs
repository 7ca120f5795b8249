//! File export for meterstat
//!
//! Writes the three artifacts of an export run into an output directory:
//!
//! - `cleaned_energy_data.csv`: every valid reading as `Building,Timestamp,kWh`
//! - `building_summary.csv`: one `Building,sum,mean,min,max` row per building
//! - `summary.txt`: the rendered campus report
//!
//! Existing files are overwritten.

use crate::aggregation_types::SummaryRow;
use crate::error::Result;
use crate::types::{MeterRecord, TIMESTAMP_FORMAT};
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CLEANED_DATA_FILE: &str = "cleaned_energy_data.csv";
pub const BUILDING_SUMMARY_FILE: &str = "building_summary.csv";
pub const SUMMARY_TEXT_FILE: &str = "summary.txt";

/// Paths written by [`Exporter::export_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub cleaned_data: PathBuf,
    pub building_summary: PathBuf,
    pub summary_text: PathBuf,
}

/// Writes export artifacts into a single directory
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    /// Create an exporter, creating the output directory if needed
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the normalized readings
    pub fn write_cleaned_data(&self, records: &[MeterRecord]) -> Result<PathBuf> {
        let path = self.output_dir.join(CLEANED_DATA_FILE);
        let mut writer = WriterBuilder::new().from_path(&path)?;
        writer.write_record(["Building", "Timestamp", "kWh"])?;

        for record in records {
            let timestamp = record.timestamp.format(TIMESTAMP_FORMAT);
            let energy = record.energy_kwh.to_string();
            writer.write_record([record.building.as_str(), timestamp.as_str(), energy.as_str()])?;
        }

        writer.flush()?;
        debug!("Wrote {} readings to {}", records.len(), path.display());
        Ok(path)
    }

    /// Write per-building summary statistics
    pub fn write_building_summary(&self, summaries: &[SummaryRow]) -> Result<PathBuf> {
        let path = self.output_dir.join(BUILDING_SUMMARY_FILE);
        let mut writer = WriterBuilder::new().from_path(&path)?;
        writer.write_record(["Building", "sum", "mean", "min", "max"])?;

        for summary in summaries {
            writer.write_record([
                summary.building.to_string(),
                summary.sum.to_string(),
                summary.mean.to_string(),
                summary.min.to_string(),
                summary.max.to_string(),
            ])?;
        }

        writer.flush()?;
        debug!("Wrote {} summary rows to {}", summaries.len(), path.display());
        Ok(path)
    }

    /// Write the rendered report text
    pub fn write_summary_text(&self, report: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(SUMMARY_TEXT_FILE);
        fs::write(&path, report)?;
        Ok(path)
    }

    /// Write all three artifacts
    pub fn export_all(
        &self,
        records: &[MeterRecord],
        summaries: &[SummaryRow],
        report: &str,
    ) -> Result<ExportedFiles> {
        let files = ExportedFiles {
            cleaned_data: self.write_cleaned_data(records)?,
            building_summary: self.write_building_summary(summaries)?,
            summary_text: self.write_summary_text(report)?,
        };
        info!("Exported results to {}", self.output_dir.display());
        Ok(files)
    }
}

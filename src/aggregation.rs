//! Aggregation module for summarizing meter readings
//!
//! This module turns a normalized stream of [`MeterRecord`]s into the tables
//! the reports are built from: per-building daily and weekly totals, summary
//! statistics, per-building and global peaks, and the campus overview.
//!
//! Every reduction here goes through [`ConsumptionStats`], the same
//! accumulator the [`BuildingLedger`](crate::ledger::BuildingLedger) uses, so
//! totals agree between the batch and the ledger views.
//!
//! # Bucketing
//!
//! Day buckets are the calendar date of a reading. Week buckets are labelled
//! with the first day of the week and start on Monday (ISO 8601) unless the
//! aggregator is configured with [`WeekStart::Sunday`]. Buckets are half-open
//! and buckets without readings are never emitted.
//!
//! # Examples
//!
//! ```
//! use meterstat::aggregation::{AggregationConfig, Aggregator};
//! use meterstat::types::MeterRecord;
//!
//! # fn example() -> meterstat::Result<()> {
//! let records = vec![
//!     MeterRecord::from_raw("BldgA", "2024-01-01 10:00", "5.0")?,
//!     MeterRecord::from_raw("BldgA", "2024-01-01 14:00", "5.0")?,
//!     MeterRecord::from_raw("BldgA", "2024-01-02 09:00", "3.0")?,
//! ];
//!
//! let aggregator = Aggregator::new(AggregationConfig::default());
//! let daily = aggregator.aggregate_daily(&records);
//! assert_eq!(daily.len(), 2);
//! assert_eq!(daily[0].total_kwh, 10.0);
//!
//! let peak = Aggregator::global_peak(&records)?;
//! assert_eq!(peak.timestamp.to_string(), "2024-01-01 10:00:00");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::aggregation_types::{
    BucketAverage, BucketedTotal, CampusOverview, PeakRecord, SummaryRow,
};
use crate::error::{MeterstatError, Result};
use crate::stats::{ConsumptionStats, outranks};
use crate::types::{BuildingName, DailyDate, Granularity, MeterRecord, Reading, WeekStart};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Raw, unvalidated fields of one input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub building: String,
    pub timestamp: String,
    pub energy_kwh: String,
}

impl RawRecord {
    pub fn new(
        building: impl Into<String>,
        timestamp: impl Into<String>,
        energy_kwh: impl Into<String>,
    ) -> Self {
        Self {
            building: building.into(),
            timestamp: timestamp.into(),
            energy_kwh: energy_kwh.into(),
        }
    }
}

/// Settings that change how readings are bucketed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationConfig {
    /// First day of a week bucket
    pub week_start: WeekStart,
}

impl AggregationConfig {
    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }
}

/// Main aggregation engine
///
/// Stateless apart from its configuration; every method is a pure function
/// of the records passed in.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregationConfig,
}

impl Aggregator {
    /// Create a new Aggregator
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    /// Get the aggregation configuration
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Validate raw rows into records sorted by timestamp
    ///
    /// Unlike the CSV loader, which skips malformed rows, this fails on the
    /// first invalid row. The sort is stable, so rows sharing a timestamp keep
    /// their input order.
    ///
    /// # Errors
    ///
    /// Returns [`MeterstatError::InvalidTimestamp`] (or `InvalidEnergy` /
    /// `InvalidArgument`) for the first row that does not validate.
    pub fn normalize(raw: impl IntoIterator<Item = RawRecord>) -> Result<Vec<MeterRecord>> {
        let mut records = raw
            .into_iter()
            .map(|row| MeterRecord::from_raw(&row.building, &row.timestamp, &row.energy_kwh))
            .collect::<Result<Vec<_>>>()?;
        records.sort_by_key(|record| record.timestamp);
        Ok(records)
    }

    /// Bucket label for a record under the given granularity
    fn bucket_of(&self, record: &MeterRecord, granularity: Granularity) -> DailyDate {
        match granularity {
            Granularity::Day => record.timestamp.to_daily_date(),
            Granularity::Week => record.timestamp.to_week_start(self.config.week_start),
        }
    }

    /// Sum readings per (building, bucket)
    ///
    /// Output is sorted by building, then bucket start, and contains one row
    /// per pair that has at least one reading.
    pub fn aggregate(
        &self,
        records: &[MeterRecord],
        granularity: Granularity,
    ) -> Vec<BucketedTotal> {
        let mut buckets: BTreeMap<(BuildingName, DailyDate), ConsumptionStats> = BTreeMap::new();

        for record in records {
            let bucket = self.bucket_of(record, granularity);
            buckets
                .entry((record.building.clone(), bucket))
                .or_default()
                .add(record.reading());
        }

        debug!(
            "Aggregated {} records into {} {} buckets",
            records.len(),
            buckets.len(),
            granularity
        );

        buckets
            .into_iter()
            .map(|((building, bucket_start), stats)| BucketedTotal {
                building,
                bucket_start,
                total_kwh: stats.total_kwh(),
            })
            .collect()
    }

    /// Daily totals per building
    pub fn aggregate_daily(&self, records: &[MeterRecord]) -> Vec<BucketedTotal> {
        self.aggregate(records, Granularity::Day)
    }

    /// Weekly totals per building, using the configured week start
    pub fn aggregate_weekly(&self, records: &[MeterRecord]) -> Vec<BucketedTotal> {
        self.aggregate(records, Granularity::Week)
    }

    /// Per-building accumulated stats, sorted by building name
    ///
    /// Records are partitioned by building keeping input order within each
    /// partition, then each partition is reduced independently in parallel.
    pub fn building_stats(records: &[MeterRecord]) -> Vec<(BuildingName, ConsumptionStats)> {
        let mut partitions: BTreeMap<&BuildingName, Vec<Reading>> = BTreeMap::new();
        for record in records {
            partitions
                .entry(&record.building)
                .or_default()
                .push(record.reading());
        }

        partitions
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(building, readings)| {
                (building.clone(), ConsumptionStats::from_readings(&readings))
            })
            .collect()
    }

    /// Sum, mean, min and max per building
    ///
    /// Buildings only appear if they have readings, so every row is defined.
    pub fn summarize(records: &[MeterRecord]) -> Vec<SummaryRow> {
        Self::building_stats(records)
            .into_iter()
            .filter_map(|(building, stats)| SummaryRow::from_stats(building, &stats))
            .collect()
    }

    /// Peak reading per building, sorted by building name
    pub fn peaks_by_building(records: &[MeterRecord]) -> Vec<PeakRecord> {
        Self::building_stats(records)
            .into_iter()
            .filter_map(|(building, stats)| {
                stats
                    .peak()
                    .map(|reading| PeakRecord::from_reading(building, reading))
            })
            .collect()
    }

    /// Maximum reading across all buildings
    ///
    /// Ties on energy go to the earliest timestamp, then to the first record
    /// in input order.
    ///
    /// # Errors
    ///
    /// Returns [`MeterstatError::EmptyDataset`] when `records` is empty.
    pub fn global_peak(records: &[MeterRecord]) -> Result<PeakRecord> {
        let mut best: Option<&MeterRecord> = None;
        for record in records {
            match best {
                Some(current) if !outranks(&record.reading(), &current.reading()) => {}
                _ => best = Some(record),
            }
        }

        best.map(|record| PeakRecord::from_reading(record.building.clone(), record.reading()))
            .ok_or(MeterstatError::EmptyDataset)
    }

    /// Building with the largest total; ties go to the first building by name
    pub fn highest_consumer(summaries: &[SummaryRow]) -> Option<&SummaryRow> {
        let mut highest: Option<&SummaryRow> = None;
        for row in summaries {
            match highest {
                Some(current) if row.sum <= current.sum => {}
                _ => highest = Some(row),
            }
        }
        highest
    }

    /// Headline figures of the campus report
    ///
    /// # Errors
    ///
    /// Returns [`MeterstatError::EmptyDataset`] when there are no readings.
    pub fn campus_overview(records: &[MeterRecord]) -> Result<CampusOverview> {
        let peak = Self::global_peak(records)?;
        let summaries = Self::summarize(records);
        let highest = Self::highest_consumer(&summaries).ok_or(MeterstatError::EmptyDataset)?;

        Ok(CampusOverview {
            total_kwh: summaries.iter().map(|row| row.sum).sum(),
            highest_building: highest.building.clone(),
            peak,
        })
    }

    /// Mean bucket total per building (e.g. average weekly consumption)
    ///
    /// Averages over the buckets that exist; empty buckets are not counted.
    pub fn average_bucket_totals(buckets: &[BucketedTotal]) -> Vec<BucketAverage> {
        let mut per_building: BTreeMap<&BuildingName, (usize, f64)> = BTreeMap::new();
        for bucket in buckets {
            let entry = per_building.entry(&bucket.building).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += bucket.total_kwh;
        }

        per_building
            .into_iter()
            .map(|(building, (count, total))| BucketAverage {
                building: building.clone(),
                buckets: count,
                average_kwh: total / count as f64,
            })
            .collect()
    }
}

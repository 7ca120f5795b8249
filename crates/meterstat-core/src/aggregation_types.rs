//! Aggregation data types for meterstat
//!
//! Pure data structures produced by the aggregator and consumed by the
//! output formatters and the exporter. None of these are mutated after
//! construction.

use crate::stats::ConsumptionStats;
use crate::types::{BuildingName, DailyDate, Reading, ReadingTime};
use serde::{Deserialize, Serialize};

/// Energy summed over one (building, bucket) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketedTotal {
    /// Building the readings belong to
    pub building: BuildingName,
    /// First day of the bucket (the date itself for daily buckets)
    pub bucket_start: DailyDate,
    /// Sum of readings in the bucket
    pub total_kwh: f64,
}

/// Summary statistics over every reading of one building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Building the statistics describe
    pub building: BuildingName,
    /// Number of readings
    pub count: usize,
    /// Sum of readings in kWh
    pub sum: f64,
    /// Mean reading in kWh
    pub mean: f64,
    /// Smallest reading in kWh
    pub min: f64,
    /// Largest reading in kWh
    pub max: f64,
}

impl SummaryRow {
    /// Build a row from accumulated stats
    ///
    /// Returns `None` for empty stats; buildings without readings are omitted
    /// from summaries rather than reported with undefined values.
    pub fn from_stats(building: BuildingName, stats: &ConsumptionStats) -> Option<Self> {
        Some(Self {
            building,
            count: stats.count(),
            sum: stats.total_kwh(),
            mean: stats.mean_kwh()?,
            min: stats.min_kwh()?,
            max: stats.max_kwh()?,
        })
    }
}

/// The maximum-valued reading of a building, or of the whole dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
    /// Building the reading belongs to
    pub building: BuildingName,
    /// When the peak occurred
    pub timestamp: ReadingTime,
    /// Peak energy in kWh
    pub energy_kwh: f64,
}

impl PeakRecord {
    /// Tag a reading with its building
    pub fn from_reading(building: BuildingName, reading: Reading) -> Self {
        Self {
            building,
            timestamp: reading.timestamp,
            energy_kwh: reading.energy_kwh,
        }
    }
}

/// Mean bucket total of a building (e.g. average weekly consumption)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketAverage {
    /// Building the average describes
    pub building: BuildingName,
    /// Number of non-empty buckets averaged over
    pub buckets: usize,
    /// Mean of the bucket totals in kWh
    pub average_kwh: f64,
}

/// Headline figures of the campus report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusOverview {
    /// Sum of every reading across all buildings
    pub total_kwh: f64,
    /// Building with the largest total consumption
    pub highest_building: BuildingName,
    /// Maximum reading across all buildings
    pub peak: PeakRecord,
}

/// Sum of a set of table rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_kwh: f64,
    /// Number of rows summed: buckets, or buildings for summary rows
    pub buckets: usize,
}

impl Totals {
    pub fn from_buckets(buckets: &[BucketedTotal]) -> Self {
        let mut totals = Self::default();
        for bucket in buckets {
            totals.total_kwh += bucket.total_kwh;
            totals.buckets += 1;
        }
        totals
    }

    pub fn from_summaries(summaries: &[SummaryRow]) -> Self {
        let mut totals = Self::default();
        for summary in summaries {
            totals.total_kwh += summary.sum;
            totals.buckets += 1;
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_summary_row_from_empty_stats() {
        let row = SummaryRow::from_stats(BuildingName::new("A"), &ConsumptionStats::default());
        assert!(row.is_none());
    }

    #[test]
    fn test_totals_from_buckets() {
        let day = DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let buckets = vec![
            BucketedTotal {
                building: BuildingName::new("A"),
                bucket_start: day,
                total_kwh: 10.0,
            },
            BucketedTotal {
                building: BuildingName::new("B"),
                bucket_start: day,
                total_kwh: 2.5,
            },
        ];
        let totals = Totals::from_buckets(&buckets);
        assert_eq!(totals.total_kwh, 12.5);
        assert_eq!(totals.buckets, 2);
    }

    #[test]
    fn test_totals_from_summaries_counts_rows() {
        let row = |name: &str, sum: f64| SummaryRow {
            building: BuildingName::new(name),
            count: 2,
            sum,
            mean: sum / 2.0,
            min: 0.0,
            max: sum,
        };
        let totals = Totals::from_summaries(&[row("A", 4.0), row("B", 6.0)]);
        assert_eq!(totals.total_kwh, 10.0);
        assert_eq!(totals.buckets, 2);
        assert_eq!(Totals::from_summaries(&[]), Totals::default());
    }
}

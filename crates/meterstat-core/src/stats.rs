//! Shared consumption reduction
//!
//! [`ConsumptionStats`] is the single accumulator behind every total, summary
//! and peak in meterstat. The batch aggregator folds records into it, the
//! building ledger folds a building's readings into it on demand, and bucket
//! totals keep one per bucket. Keeping the arithmetic in one place means the
//! ledger and the aggregator can never disagree about a total.

use crate::types::Reading;
use serde::{Deserialize, Serialize};

/// Returns true if `candidate` should replace `current` as the peak reading.
///
/// Higher energy wins; on equal energy the earlier timestamp wins. Equal
/// energy and equal timestamp keeps `current`, so the first reading seen in
/// input order is retained.
pub fn outranks(candidate: &Reading, current: &Reading) -> bool {
    if candidate.energy_kwh > current.energy_kwh {
        return true;
    }
    candidate.energy_kwh == current.energy_kwh && candidate.timestamp < current.timestamp
}

/// Running count, sum, extrema and peak over a set of readings
///
/// # Examples
/// ```
/// use meterstat_core::stats::ConsumptionStats;
/// use meterstat_core::types::{Reading, ReadingTime};
///
/// let mut stats = ConsumptionStats::default();
/// stats.add(Reading::new(ReadingTime::parse("2024-01-01 10:00").unwrap(), 5.0));
/// stats.add(Reading::new(ReadingTime::parse("2024-01-01 14:00").unwrap(), 3.0));
///
/// assert_eq!(stats.count(), 2);
/// assert_eq!(stats.total_kwh(), 8.0);
/// assert_eq!(stats.mean_kwh(), Some(4.0));
/// assert_eq!(stats.peak().unwrap().energy_kwh, 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionStats {
    count: usize,
    total_kwh: f64,
    min_kwh: Option<f64>,
    max_kwh: Option<f64>,
    peak: Option<Reading>,
}

impl ConsumptionStats {
    /// Fold an iterator of readings, in input order
    pub fn from_readings<'a>(readings: impl IntoIterator<Item = &'a Reading>) -> Self {
        let mut stats = Self::default();
        for reading in readings {
            stats.add(*reading);
        }
        stats
    }

    /// Add one reading
    pub fn add(&mut self, reading: Reading) {
        let kwh = reading.energy_kwh;
        self.count += 1;
        self.total_kwh += kwh;
        self.min_kwh = Some(self.min_kwh.map_or(kwh, |min| min.min(kwh)));
        self.max_kwh = Some(self.max_kwh.map_or(kwh, |max| max.max(kwh)));

        match self.peak {
            Some(ref current) if !outranks(&reading, current) => {}
            _ => self.peak = Some(reading),
        }
    }

    /// Merge another accumulator into this one
    ///
    /// `other` must cover readings that come after this accumulator's readings
    /// in input order, otherwise the first-seen rule for exact peak ties is lost.
    pub fn merge(&mut self, other: Self) {
        self.count += other.count;
        self.total_kwh += other.total_kwh;
        self.min_kwh = match (self.min_kwh, other.min_kwh) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max_kwh = match (self.max_kwh, other.max_kwh) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.peak = match (self.peak, other.peak) {
            (Some(current), Some(candidate)) if outranks(&candidate, &current) => Some(candidate),
            (Some(current), _) => Some(current),
            (None, candidate) => candidate,
        };
    }

    /// Number of readings seen
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether no readings have been added
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sum of all readings; zero when empty
    pub fn total_kwh(&self) -> f64 {
        self.total_kwh
    }

    /// Arithmetic mean over the readings actually present
    pub fn mean_kwh(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total_kwh / self.count as f64)
    }

    /// Smallest reading
    pub fn min_kwh(&self) -> Option<f64> {
        self.min_kwh
    }

    /// Largest reading
    pub fn max_kwh(&self) -> Option<f64> {
        self.max_kwh
    }

    /// Peak reading under the [`outranks`] ordering
    pub fn peak(&self) -> Option<Reading> {
        self.peak
    }
}

//! In-memory per-building ledger
//!
//! The ledger is the stateful view of the same data the
//! [`Aggregator`](crate::aggregation::Aggregator) reduces in batch: readings
//! are appended one at a time to their [`Building`], and totals, peaks and
//! report lines are derived from the accumulated readings on demand through
//! the shared [`ConsumptionStats`] reduction.
//!
//! # Lifecycle
//!
//! A ledger is created empty, populated with
//! [`BuildingLedger::add_building_reading`], and then read. Nothing stops a
//! caller from appending after reading; any report produced earlier simply
//! no longer reflects the ledger. Reports are only stable once ingestion has
//! finished.
//!
//! The ledger is a plain owned value with `&mut self` writers, so independent
//! runs (and tests) never share state.
//!
//! # Examples
//!
//! ```
//! use meterstat::ledger::BuildingLedger;
//! use meterstat::types::ReadingTime;
//!
//! # fn example() -> meterstat::Result<()> {
//! let mut ledger = BuildingLedger::new();
//! ledger.add_building_reading("Library", ReadingTime::parse("2024-01-01 10:00")?, 5.0);
//! ledger.add_building_reading("Library", ReadingTime::parse("2024-01-01 14:00")?, 2.5);
//! ledger.get_or_create("Annex");
//!
//! let reports = ledger.generate_all_reports();
//! assert_eq!(reports[0], "Library: Total=7.50 kWh, Peak=5.00 at 2024-01-01 10:00:00");
//! assert_eq!(reports[1], "Annex: No readings");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::aggregation_types::{PeakRecord, SummaryRow};
use crate::error::{MeterstatError, Result};
use crate::stats::{ConsumptionStats, outranks};
use crate::types::{BuildingName, MeterRecord, Reading, ReadingTime};
use std::collections::HashMap;
use tracing::debug;

/// A named building and the readings it owns
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    name: BuildingName,
    readings: Vec<Reading>,
}

impl Building {
    /// Create a building with no readings
    pub fn new(name: BuildingName) -> Self {
        Self {
            name,
            readings: Vec::new(),
        }
    }

    pub fn name(&self) -> &BuildingName {
        &self.name
    }

    /// Readings in the order they were added
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Append a reading
    pub fn add_reading(&mut self, timestamp: ReadingTime, energy_kwh: f64) {
        self.readings.push(Reading::new(timestamp, energy_kwh));
    }

    /// Reduce the current readings
    pub fn stats(&self) -> ConsumptionStats {
        ConsumptionStats::from_readings(&self.readings)
    }

    /// Sum of all readings; zero for a building without readings
    pub fn calculate_total_consumption(&self) -> f64 {
        self.stats().total_kwh()
    }

    /// Highest reading, earliest first on ties
    ///
    /// # Errors
    ///
    /// Returns [`MeterstatError::EmptyEntity`] when the building has no readings.
    pub fn peak(&self) -> Result<PeakRecord> {
        self.stats()
            .peak()
            .map(|reading| PeakRecord::from_reading(self.name.clone(), reading))
            .ok_or_else(|| MeterstatError::EmptyEntity(self.name.clone()))
    }

    /// Summary statistics, or `None` when there are no readings
    pub fn summary(&self) -> Option<SummaryRow> {
        SummaryRow::from_stats(self.name.clone(), &self.stats())
    }

    /// One-line report with total and peak
    ///
    /// A building without readings reports `"{name}: No readings"` instead of
    /// a peak.
    pub fn generate_report(&self) -> String {
        let stats = self.stats();
        match stats.peak() {
            Some(peak) => format!(
                "{}: Total={:.2} kWh, Peak={:.2} at {}",
                self.name,
                stats.total_kwh(),
                peak.energy_kwh,
                peak.timestamp
            ),
            None => format!("{}: No readings", self.name),
        }
    }
}

/// Caller-owned collection of buildings keyed by exact name
///
/// Buildings are kept in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct BuildingLedger {
    buildings: Vec<Building>,
    index: HashMap<BuildingName, usize>,
}

impl BuildingLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger by appending every record in order
    pub fn from_records(records: &[MeterRecord]) -> Self {
        let mut ledger = Self::new();
        for record in records {
            ledger.add_building_reading(
                record.building.as_str(),
                record.timestamp,
                record.energy_kwh,
            );
        }
        debug!(
            "Ledger built with {} buildings from {} records",
            ledger.len(),
            records.len()
        );
        ledger
    }

    /// Get a building, creating it with no readings on first reference
    pub fn get_or_create(&mut self, name: &str) -> &mut Building {
        let position = match self.index.get(name) {
            Some(&position) => position,
            None => {
                let building = BuildingName::new(name);
                debug!("Registering building '{}'", building);
                let position = self.buildings.len();
                self.index.insert(building.clone(), position);
                self.buildings.push(Building::new(building));
                position
            }
        };
        &mut self.buildings[position]
    }

    /// Append a reading to a building, creating the building if needed
    pub fn add_building_reading(&mut self, name: &str, timestamp: ReadingTime, energy_kwh: f64) {
        self.get_or_create(name).add_reading(timestamp, energy_kwh);
    }

    /// Look up a building by exact name without creating it
    pub fn building(&self, name: &str) -> Option<&Building> {
        self.index
            .get(name)
            .map(|&position| &self.buildings[position])
    }

    /// Buildings in order of first appearance
    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// One report line per building, in order of first appearance
    pub fn generate_all_reports(&self) -> Vec<String> {
        self.buildings.iter().map(Building::generate_report).collect()
    }

    /// Sum over every building
    pub fn total_consumption(&self) -> f64 {
        self.buildings
            .iter()
            .map(Building::calculate_total_consumption)
            .sum()
    }

    /// Summary rows for buildings that have readings
    pub fn summaries(&self) -> Vec<SummaryRow> {
        self.buildings.iter().filter_map(Building::summary).collect()
    }

    /// Peak per building; buildings without readings are skipped
    pub fn peaks(&self) -> Vec<PeakRecord> {
        self.buildings
            .iter()
            .filter_map(|building| building.peak().ok())
            .collect()
    }

    /// Peak across all buildings
    ///
    /// Buildings without readings do not take part. Exact ties between
    /// buildings go to the building registered first.
    ///
    /// # Errors
    ///
    /// Returns [`MeterstatError::EmptyDataset`] when no building has readings.
    pub fn global_peak(&self) -> Result<PeakRecord> {
        let mut best: Option<(&BuildingName, Reading)> = None;
        for building in &self.buildings {
            let Some(candidate) = building.stats().peak() else {
                continue;
            };
            match best {
                Some((_, current)) if !outranks(&candidate, &current) => {}
                _ => best = Some((&building.name, candidate)),
            }
        }

        best.map(|(name, reading)| PeakRecord::from_reading(name.clone(), reading))
            .ok_or(MeterstatError::EmptyDataset)
    }
}

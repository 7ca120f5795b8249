//! Common test utilities and helpers for meterstat tests
//!
//! This module provides a record builder, CSV fixture writers, and helper
//! functions shared by the integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use meterstat::{data_loader::DataLoader, types::MeterRecord};
use std::fs;
use tempfile::TempDir;

/// Buildings used across tests
pub const TEST_BUILDINGS: &[&str] = &["Library", "Gym", "Science Hall", "Dormitory"];

/// Builder for creating test MeterRecord instances
pub struct MeterRecordBuilder {
    building: String,
    timestamp: NaiveDateTime,
    energy_kwh: f64,
}

impl MeterRecordBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            building: TEST_BUILDINGS[0].to_string(),
            timestamp: base_time(),
            energy_kwh: 1.0,
        }
    }

    pub fn with_building(mut self, building: &str) -> Self {
        self.building = building.to_string();
        self
    }

    pub fn with_time(mut self, year: i32, month: u32, day: u32, hour: u32) -> Self {
        self.timestamp = NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        self
    }

    pub fn with_offset_hours(mut self, hours: i64) -> Self {
        self.timestamp = base_time() + Duration::hours(hours);
        self
    }

    pub fn with_energy(mut self, energy_kwh: f64) -> Self {
        self.energy_kwh = energy_kwh;
        self
    }

    /// Build the record through the validating constructor
    pub fn build(self) -> MeterRecord {
        MeterRecord::from_raw(
            &self.building,
            &self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            &self.energy_kwh.to_string(),
        )
        .unwrap()
    }

    /// Render as a `Building,Timestamp,kWh` CSV line
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{}",
            self.building,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.energy_kwh
        )
    }
}

impl Default for MeterRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Monday 2024-01-01 00:00
pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Write CSV files into a fresh temp directory and return a loader for it
pub fn create_test_data_dir(files: &[(&str, String)]) -> (TempDir, DataLoader) {
    let temp_dir = TempDir::new().unwrap();
    for (name, contents) in files {
        fs::write(temp_dir.path().join(name), contents).unwrap();
    }
    let loader = DataLoader::new(temp_dir.path()).unwrap();
    (temp_dir, loader)
}

/// Hourly readings for one building, `Timestamp,kWh` only
///
/// Energy follows a simple daily pattern peaking in the early afternoon.
pub fn generate_hourly_csv(days: i64) -> String {
    let mut csv = String::from("Timestamp,kWh\n");
    for hour in 0..days * 24 {
        let time = base_time() + Duration::hours(hour);
        let hour_of_day = hour % 24;
        let energy = 10.0 + (12 - (hour_of_day - 14).abs()) as f64;
        csv.push_str(&format!("{},{}\n", time.format("%Y-%m-%d %H:%M:%S"), energy));
    }
    csv
}

/// Records for several buildings across a number of days
pub fn generate_campus_records(days: i64) -> Vec<MeterRecord> {
    let mut records = Vec::new();
    for hour in 0..days * 24 {
        for (i, building) in TEST_BUILDINGS.iter().enumerate() {
            records.push(
                MeterRecordBuilder::new()
                    .with_building(building)
                    .with_offset_hours(hour)
                    .with_energy(((hour as usize * 7 + i * 13) % 50) as f64 + 0.5)
                    .build(),
            );
        }
    }
    records
}

/// Assert two floats are within a tolerance
pub fn assert_approx_eq(a: f64, b: f64, tolerance: f64) {
    assert!(
        (a - b).abs() < tolerance,
        "Values not approximately equal: {} vs {} (tolerance: {})",
        a,
        b,
        tolerance
    );
}

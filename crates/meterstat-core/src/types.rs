//! Core domain types for meterstat
//!
//! This module contains the fundamental types used throughout the meterstat library.
//! These types provide strong typing for building names, reading timestamps,
//! bucket dates and the normalized meter records themselves.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::{MeterstatError, Result};

/// Format used whenever a reading timestamp is shown or exported
///
/// `%.f` prints nothing for whole seconds, so sub-second readings keep their
/// precision without changing the common case.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Format used for day and week bucket labels
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Naive layouts accepted by [`ReadingTime::parse`] after RFC 3339
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Range of calendar years a reading may fall in
const VALID_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Strongly-typed building name
///
/// Building names are the ledger keys: case-sensitive and matched exactly.
///
/// # Examples
/// ```
/// use meterstat_core::types::BuildingName;
///
/// let building = BuildingName::new("Library");
/// assert_eq!(building.as_str(), "Library");
/// assert_ne!(building, BuildingName::new("library"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingName(String);

impl BuildingName {
    /// Create a new BuildingName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BuildingName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for BuildingName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Wall-clock instant of a meter reading
///
/// Readings keep the local time exactly as the source encoded it; no timezone
/// conversion is applied. Offsets present in RFC 3339 input are dropped after
/// parsing, keeping the written wall-clock time.
///
/// # Examples
/// ```
/// use meterstat_core::types::ReadingTime;
///
/// let ts = ReadingTime::parse("2024-01-15 10:30:00").unwrap();
/// assert_eq!(ts.to_daily_date().format("%Y-%m-%d"), "2024-01-15");
/// assert_eq!(ts.to_string(), "2024-01-15 10:30:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReadingTime(NaiveDateTime);

impl ReadingTime {
    /// Create a new ReadingTime
    pub fn new(dt: NaiveDateTime) -> Self {
        Self(dt)
    }

    /// Get the inner NaiveDateTime
    pub fn inner(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Parse a timestamp string
    ///
    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS[.fff]]` with either a space or a
    /// `T` separator, and a bare `YYYY-MM-DD` (interpreted as midnight).
    ///
    /// # Errors
    ///
    /// Returns [`MeterstatError::InvalidTimestamp`] when none of the layouts
    /// match, or when the year is outside `1..=9999`.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let parsed = Self::parse_naive(value)
            .ok_or_else(|| MeterstatError::InvalidTimestamp(value.to_string()))?;

        if !VALID_YEARS.contains(&parsed.year()) {
            return Err(MeterstatError::InvalidTimestamp(format!(
                "{value} (year out of range)"
            )));
        }
        Ok(Self(parsed))
    }

    fn parse_naive(value: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.naive_local());
        }

        NAIVE_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, DATE_FORMAT)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }

    /// Calendar date of this reading
    pub fn to_daily_date(&self) -> DailyDate {
        DailyDate::new(self.0.date())
    }

    /// First day of the week containing this reading
    pub fn to_week_start(&self, week_start: WeekStart) -> DailyDate {
        self.to_daily_date().week_start(week_start)
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

/// Calendar date used as a bucket label
///
/// # Examples
/// ```
/// use meterstat_core::types::{DailyDate, WeekStart};
/// use chrono::NaiveDate;
///
/// // 2024-01-03 is a Wednesday
/// let daily = DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
/// assert_eq!(daily.week_start(WeekStart::Monday).format("%Y-%m-%d"), "2024-01-01");
/// assert_eq!(daily.week_start(WeekStart::Sunday).format("%Y-%m-%d"), "2023-12-31");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Date of the first day of the week containing this date
    ///
    /// Saturates at the earliest representable date instead of overflowing.
    pub fn week_start(&self, week_start: WeekStart) -> Self {
        let offset = match week_start {
            WeekStart::Monday => self.0.weekday().num_days_from_monday(),
            WeekStart::Sunday => self.0.weekday().num_days_from_sunday(),
        };
        Self(
            self.0
                .checked_sub_days(Days::new(u64::from(offset)))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// First day of a week bucket
///
/// Weeks start on Monday (ISO 8601) unless configured otherwise. Each week
/// bucket is the half-open interval `[start, start + 7 days)`.
///
/// # Examples
/// ```
/// use meterstat_core::types::WeekStart;
/// use std::str::FromStr;
///
/// assert_eq!(WeekStart::from_str("sunday").unwrap(), WeekStart::Sunday);
/// assert_eq!(WeekStart::default(), WeekStart::Monday);
/// assert_eq!(WeekStart::Monday.to_string(), "monday");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// ISO weeks, Monday through Sunday
    #[default]
    Monday,
    /// Weeks running Sunday through Saturday
    Sunday,
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monday => write!(f, "monday"),
            Self::Sunday => write!(f, "sunday"),
        }
    }
}

impl std::str::FromStr for WeekStart {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" | "mon" => Ok(Self::Monday),
            "sunday" | "sun" => Ok(Self::Sunday),
            _ => Err(format!("Invalid start of week: {s} (expected monday or sunday)")),
        }
    }
}

/// Width of a time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One calendar day
    Day,
    /// One calendar week
    Week,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
        }
    }
}

/// One meter sample
///
/// Immutable once created; `energy_kwh` is finite and non-negative when the
/// reading comes out of [`MeterRecord::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the sample was taken
    pub timestamp: ReadingTime,
    /// Energy consumed in kWh
    pub energy_kwh: f64,
}

impl Reading {
    /// Create a new Reading
    pub fn new(timestamp: ReadingTime, energy_kwh: f64) -> Self {
        Self {
            timestamp,
            energy_kwh,
        }
    }
}

/// A reading tagged with the building it belongs to
///
/// This is the unit of the normalized stream consumed by the aggregator and
/// the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterRecord {
    /// Owning building
    pub building: BuildingName,
    /// When the sample was taken
    pub timestamp: ReadingTime,
    /// Energy consumed in kWh
    pub energy_kwh: f64,
}

impl MeterRecord {
    /// Create a new MeterRecord from already validated parts
    pub fn new(building: BuildingName, timestamp: ReadingTime, energy_kwh: f64) -> Self {
        Self {
            building,
            timestamp,
            energy_kwh,
        }
    }

    /// Validate and build a record from raw tabular fields
    ///
    /// # Errors
    ///
    /// - [`MeterstatError::InvalidArgument`] for an empty building name
    /// - [`MeterstatError::InvalidTimestamp`] for an unparsable timestamp
    /// - [`MeterstatError::InvalidEnergy`] for a non-numeric, negative or non-finite value
    pub fn from_raw(building: &str, timestamp: &str, energy_kwh: &str) -> Result<Self> {
        let building = building.trim();
        if building.is_empty() {
            return Err(MeterstatError::InvalidArgument(
                "building name is empty".to_string(),
            ));
        }

        let timestamp = ReadingTime::parse(timestamp)?;
        let energy_kwh = parse_energy(energy_kwh)?;

        Ok(Self::new(BuildingName::new(building), timestamp, energy_kwh))
    }

    /// The untagged reading
    pub fn reading(&self) -> Reading {
        Reading::new(self.timestamp, self.energy_kwh)
    }
}

/// Parse an energy value in kWh
fn parse_energy(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let kwh: f64 = trimmed
        .parse()
        .map_err(|_| MeterstatError::InvalidEnergy(trimmed.to_string()))?;

    if !kwh.is_finite() || kwh < 0.0 {
        return Err(MeterstatError::InvalidEnergy(trimmed.to_string()));
    }
    Ok(kwh)
}

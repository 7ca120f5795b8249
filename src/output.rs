//! Output formatting module for meterstat
//!
//! This module renders aggregation results in two formats:
//! - Table format for human-readable terminal output and `summary.txt`
//! - JSON format for machine-readable output and integration with other tools
//!
//! Formatters do no computation beyond laying out the values they are given.
//! Energy values are always printed with two decimals.
//!
//! # Examples
//!
//! ```
//! use meterstat::aggregation::Aggregator;
//! use meterstat::aggregation_types::Totals;
//! use meterstat::output::get_formatter;
//! use meterstat::types::MeterRecord;
//!
//! # fn example() -> meterstat::Result<()> {
//! let records = vec![MeterRecord::from_raw("Library", "2024-01-01 10:00", "4.5")?];
//! let daily = Aggregator::default().aggregate_daily(&records);
//! let totals = Totals::from_buckets(&daily);
//!
//! // Table formatter for human-readable output
//! let formatter = get_formatter(false);
//! assert!(formatter.format_daily(&daily, &totals).contains("4.50"));
//!
//! // JSON formatter for machine-readable output
//! let json_formatter = get_formatter(true);
//! assert!(json_formatter.format_daily(&daily, &totals).contains("\"daily\""));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::aggregation_types::{
    BucketAverage, BucketedTotal, CampusOverview, PeakRecord, SummaryRow, Totals,
};
use crate::types::{DATE_FORMAT, WeekStart};
use prettytable::{Cell, Row, Table, format, row};
use serde_json::{Value, json};

/// Everything the campus report is rendered from
#[derive(Debug, Clone, Copy)]
pub struct CampusReport<'a> {
    /// Headline figures
    pub overview: &'a CampusOverview,
    /// Weekly totals per building
    pub weekly: &'a [BucketedTotal],
    /// Daily totals per building
    pub daily: &'a [BucketedTotal],
    /// Ledger report lines, one per building
    pub building_reports: &'a [String],
}

/// Trait for output formatters
///
/// This trait defines the interface for formatting the aggregation tables.
/// [`format_campus_report`](OutputFormatter::format_campus_report) is the
/// entry point for the full report; the other methods render single tables.
pub trait OutputFormatter {
    /// Format daily totals
    fn format_daily(&self, data: &[BucketedTotal], totals: &Totals) -> String;

    /// Format weekly totals
    fn format_weekly(&self, data: &[BucketedTotal], totals: &Totals, week_start: WeekStart)
    -> String;

    /// Format per-building summary statistics
    fn format_summary(&self, data: &[SummaryRow]) -> String;

    /// Format per-building peak readings and the campus-wide peak
    ///
    /// `global` is `None` when there are no readings at all.
    fn format_peaks(&self, data: &[PeakRecord], global: Option<&PeakRecord>) -> String;

    /// Format mean bucket totals per building
    fn format_averages(&self, data: &[BucketAverage]) -> String;

    /// Format the ledger report lines
    fn format_building_reports(&self, reports: &[String]) -> String;

    /// Format the full campus report
    fn format_campus_report(&self, report: &CampusReport<'_>) -> String;
}

/// Table formatter for human-readable output
///
/// Produces ASCII tables suitable for terminal display and for the exported
/// `summary.txt`.
pub struct TableFormatter;

impl TableFormatter {
    /// Format an energy value with two decimals
    fn format_kwh(value: f64) -> String {
        format!("{value:.2}")
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    /// Bucket table shared by the daily and weekly views
    fn bucket_table(data: &[BucketedTotal], totals: &Totals, date_title: &str) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Building", b -> date_title, b -> "kWh"]);

        for bucket in data {
            table.add_row(row![
                bucket.building,
                bucket.bucket_start.format(DATE_FORMAT),
                r -> Self::format_kwh(bucket.total_kwh)
            ]);
        }

        // Add separator
        table.add_row(Row::new(vec![Cell::new(""); 3]));

        // Add totals row
        table.add_row(row![b -> "TOTAL", "", br -> Self::format_kwh(totals.total_kwh)]);

        table.to_string()
    }

    fn plain_bucket_table(data: &[BucketedTotal], date_title: &str) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Building", b -> date_title, b -> "kWh"]);
        for bucket in data {
            table.add_row(row![
                bucket.building,
                bucket.bucket_start.format(DATE_FORMAT),
                r -> Self::format_kwh(bucket.total_kwh)
            ]);
        }
        table.to_string()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_daily(&self, data: &[BucketedTotal], totals: &Totals) -> String {
        Self::bucket_table(data, totals, "Date")
    }

    fn format_weekly(
        &self,
        data: &[BucketedTotal],
        totals: &Totals,
        week_start: WeekStart,
    ) -> String {
        let mut output = format!("Weeks start on {week_start}\n");
        output.push_str(&Self::bucket_table(data, totals, "Week Start"));
        output
    }

    fn format_summary(&self, data: &[SummaryRow]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Building",
            b -> "Readings",
            b -> "Sum (kWh)",
            b -> "Mean (kWh)",
            b -> "Min (kWh)",
            b -> "Max (kWh)"
        ]);

        for summary in data {
            table.add_row(row![
                summary.building,
                r -> summary.count,
                r -> Self::format_kwh(summary.sum),
                r -> Self::format_kwh(summary.mean),
                r -> Self::format_kwh(summary.min),
                r -> Self::format_kwh(summary.max)
            ]);
        }

        table.add_row(Row::new(vec![Cell::new(""); 6]));
        let totals = Totals::from_summaries(data);
        table.add_row(row![
            b -> "TOTAL",
            br -> data.iter().map(|s| s.count).sum::<usize>(),
            br -> Self::format_kwh(totals.total_kwh),
            "",
            "",
            ""
        ]);

        table.to_string()
    }

    fn format_peaks(&self, data: &[PeakRecord], global: Option<&PeakRecord>) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Building", b -> "Peak Time", b -> "kWh"]);

        for peak in data {
            table.add_row(row![
                peak.building,
                peak.timestamp,
                r -> Self::format_kwh(peak.energy_kwh)
            ]);
        }

        let mut output = table.to_string();
        if let Some(peak) = global {
            output.push_str(&format!(
                "\nCampus Peak: {} at {}, {} kWh\n",
                peak.building,
                peak.timestamp,
                Self::format_kwh(peak.energy_kwh)
            ));
        }
        output
    }

    fn format_averages(&self, data: &[BucketAverage]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Building", b -> "Weeks", b -> "Average kWh"]);

        for average in data {
            table.add_row(row![
                average.building,
                r -> average.buckets,
                r -> Self::format_kwh(average.average_kwh)
            ]);
        }

        table.to_string()
    }

    fn format_building_reports(&self, reports: &[String]) -> String {
        let mut output = String::new();
        for line in reports {
            output.push_str(line);
            output.push('\n');
        }
        output
    }

    fn format_campus_report(&self, report: &CampusReport<'_>) -> String {
        let overview = report.overview;
        let mut output = String::new();

        output.push_str(&format!(
            "Total Campus Consumption: {} kWh\n",
            Self::format_kwh(overview.total_kwh)
        ));
        output.push_str(&format!(
            "Highest Consuming Building: {}\n",
            overview.highest_building
        ));
        output.push_str(&format!(
            "Peak Load Time: {}, Consumption: {} kWh\n",
            overview.peak.timestamp,
            Self::format_kwh(overview.peak.energy_kwh)
        ));

        output.push_str("\nWeekly Trends:\n");
        output.push_str(&Self::plain_bucket_table(report.weekly, "Week Start"));
        output.push_str("\n\nDaily Trends:\n");
        output.push_str(&Self::plain_bucket_table(report.daily, "Date"));

        if !report.building_reports.is_empty() {
            output.push_str("\n\nBuilding Reports:\n");
            output.push_str(&self.format_building_reports(report.building_reports));
        }

        output
    }
}

/// JSON formatter for machine-readable output
///
/// Produces structured JSON that can be parsed by other tools. Energy values
/// are emitted as raw numbers; dates and timestamps as strings.
pub struct JsonFormatter;

impl JsonFormatter {
    fn bucket_json(data: &[BucketedTotal]) -> Vec<Value> {
        data.iter()
            .map(|bucket| {
                json!({
                    "building": bucket.building,
                    "bucket_start": bucket.bucket_start.format(DATE_FORMAT),
                    "total_kwh": bucket.total_kwh,
                })
            })
            .collect()
    }

    fn peak_json(peak: &PeakRecord) -> Value {
        json!({
            "building": peak.building,
            "timestamp": peak.timestamp.to_string(),
            "energy_kwh": peak.energy_kwh,
        })
    }

    fn to_pretty(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_daily(&self, data: &[BucketedTotal], totals: &Totals) -> String {
        Self::to_pretty(&json!({
            "daily": Self::bucket_json(data),
            "totals": {
                "total_kwh": totals.total_kwh,
                "buckets": totals.buckets,
            }
        }))
    }

    fn format_weekly(
        &self,
        data: &[BucketedTotal],
        totals: &Totals,
        week_start: WeekStart,
    ) -> String {
        Self::to_pretty(&json!({
            "week_start": week_start,
            "weekly": Self::bucket_json(data),
            "totals": {
                "total_kwh": totals.total_kwh,
                "buckets": totals.buckets,
            }
        }))
    }

    fn format_summary(&self, data: &[SummaryRow]) -> String {
        Self::to_pretty(&json!({
            "summary": data.iter().map(|s| json!({
                "building": s.building,
                "count": s.count,
                "sum": s.sum,
                "mean": s.mean,
                "min": s.min,
                "max": s.max,
            })).collect::<Vec<_>>(),
            "totals": {
                "total_kwh": Totals::from_summaries(data).total_kwh,
            }
        }))
    }

    fn format_peaks(&self, data: &[PeakRecord], global: Option<&PeakRecord>) -> String {
        Self::to_pretty(&json!({
            "peaks": data.iter().map(Self::peak_json).collect::<Vec<_>>(),
            "global_peak": global.map(Self::peak_json),
        }))
    }

    fn format_averages(&self, data: &[BucketAverage]) -> String {
        Self::to_pretty(&json!({
            "averages": data.iter().map(|a| json!({
                "building": a.building,
                "buckets": a.buckets,
                "average_kwh": a.average_kwh,
            })).collect::<Vec<_>>(),
        }))
    }

    fn format_building_reports(&self, reports: &[String]) -> String {
        Self::to_pretty(&json!({ "reports": reports }))
    }

    fn format_campus_report(&self, report: &CampusReport<'_>) -> String {
        let overview = report.overview;
        Self::to_pretty(&json!({
            "total_kwh": overview.total_kwh,
            "highest_building": overview.highest_building,
            "peak": Self::peak_json(&overview.peak),
            "weekly": Self::bucket_json(report.weekly),
            "daily": Self::bucket_json(report.daily),
            "reports": report.building_reports,
        }))
    }
}

/// Get the appropriate formatter based on output preference
///
/// # Examples
///
/// ```
/// use meterstat::output::get_formatter;
///
/// let formatter = get_formatter(true);
/// assert!(formatter.format_peaks(&[], None).contains("\"peaks\""));
/// ```
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuildingName, DailyDate, ReadingTime};
    use chrono::NaiveDate;

    fn bucket(building: &str, y: i32, m: u32, d: u32, kwh: f64) -> BucketedTotal {
        BucketedTotal {
            building: BuildingName::new(building),
            bucket_start: DailyDate::new(NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            total_kwh: kwh,
        }
    }

    fn overview() -> CampusOverview {
        CampusOverview {
            total_kwh: 13.0,
            highest_building: BuildingName::new("BldgA"),
            peak: PeakRecord {
                building: BuildingName::new("BldgA"),
                timestamp: ReadingTime::parse("2024-01-01 10:00").unwrap(),
                energy_kwh: 5.0,
            },
        }
    }

    #[test]
    fn test_kwh_formatting() {
        assert_eq!(TableFormatter::format_kwh(13.0), "13.00");
        assert_eq!(TableFormatter::format_kwh(4.333333), "4.33");
        assert_eq!(TableFormatter::format_kwh(0.0), "0.00");
    }

    #[test]
    fn test_table_formatter_daily() {
        let formatter = TableFormatter;

        let empty_output = formatter.format_daily(&[], &Totals::default());
        assert!(empty_output.contains("TOTAL"));

        let data = vec![
            bucket("BldgA", 2024, 1, 1, 10.0),
            bucket("BldgA", 2024, 1, 2, 3.0),
        ];
        let output = formatter.format_daily(&data, &Totals::from_buckets(&data));
        assert!(output.contains("2024-01-01"));
        assert!(output.contains("10.00"));
        assert!(output.contains("3.00"));
        assert!(output.contains("13.00"));
    }

    #[test]
    fn test_table_formatter_weekly_names_convention() {
        let data = vec![bucket("BldgA", 2024, 1, 1, 13.0)];
        let output =
            TableFormatter.format_weekly(&data, &Totals::from_buckets(&data), WeekStart::Monday);
        assert!(output.starts_with("Weeks start on monday"));
        assert!(output.contains("Week Start"));
    }

    #[test]
    fn test_table_formatter_summary() {
        let data = vec![SummaryRow {
            building: BuildingName::new("BldgA"),
            count: 3,
            sum: 13.0,
            mean: 13.0 / 3.0,
            min: 3.0,
            max: 5.0,
        }];
        let output = TableFormatter.format_summary(&data);
        assert!(output.contains("BldgA"));
        assert!(output.contains("13.00"));
        assert!(output.contains("4.33"));
        assert!(output.contains("3.00"));
        assert!(output.contains("5.00"));
    }

    #[test]
    fn test_campus_report_layout() {
        let overview = overview();
        let weekly = vec![bucket("BldgA", 2024, 1, 1, 13.0)];
        let daily = vec![
            bucket("BldgA", 2024, 1, 1, 10.0),
            bucket("BldgA", 2024, 1, 2, 3.0),
        ];
        let reports = vec!["BldgA: Total=13.00 kWh, Peak=5.00 at 2024-01-01 10:00:00".to_string()];
        let report = CampusReport {
            overview: &overview,
            weekly: &weekly,
            daily: &daily,
            building_reports: &reports,
        };

        let output = TableFormatter.format_campus_report(&report);
        assert!(output.starts_with(
            "Total Campus Consumption: 13.00 kWh\n\
             Highest Consuming Building: BldgA\n\
             Peak Load Time: 2024-01-01 10:00:00, Consumption: 5.00 kWh\n"
        ));

        let weekly_at = output.find("Weekly Trends:").unwrap();
        let daily_at = output.find("Daily Trends:").unwrap();
        let reports_at = output.find("Building Reports:").unwrap();
        assert!(weekly_at < daily_at && daily_at < reports_at);
        assert!(output.contains("2024-01-02"));
    }

    #[test]
    fn test_campus_report_without_ledger_lines() {
        let overview = overview();
        let report = CampusReport {
            overview: &overview,
            weekly: &[],
            daily: &[],
            building_reports: &[],
        };
        let output = TableFormatter.format_campus_report(&report);
        assert!(!output.contains("Building Reports:"));
    }

    #[test]
    fn test_building_reports() {
        let reports = vec!["A: No readings".to_string(), "B: No readings".to_string()];
        assert_eq!(
            TableFormatter.format_building_reports(&reports),
            "A: No readings\nB: No readings\n"
        );
    }

    #[test]
    fn test_json_formatter_daily() {
        let data = vec![bucket("BldgA", 2024, 1, 1, 10.0)];
        let output = JsonFormatter.format_daily(&data, &Totals::from_buckets(&data));
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["daily"][0]["building"], "BldgA");
        assert_eq!(parsed["daily"][0]["bucket_start"], "2024-01-01");
        assert_eq!(parsed["daily"][0]["total_kwh"], 10.0);
        assert_eq!(parsed["totals"]["buckets"], 1);
    }

    #[test]
    fn test_json_formatter_campus_report() {
        let overview = overview();
        let report = CampusReport {
            overview: &overview,
            weekly: &[],
            daily: &[],
            building_reports: &[],
        };
        let output = JsonFormatter.format_campus_report(&report);
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["total_kwh"], 13.0);
        assert_eq!(parsed["highest_building"], "BldgA");
        assert_eq!(parsed["peak"]["timestamp"], "2024-01-01 10:00:00");
    }

    #[test]
    fn test_peaks_include_campus_peak() {
        let peaks = vec![overview().peak];
        let global = overview().peak;

        let table = TableFormatter.format_peaks(&peaks, Some(&global));
        assert!(table.contains("Campus Peak: BldgA at 2024-01-01 10:00:00, 5.00 kWh"));
        assert!(!TableFormatter.format_peaks(&[], None).contains("Campus Peak"));

        let parsed: Value =
            serde_json::from_str(&JsonFormatter.format_peaks(&peaks, Some(&global))).unwrap();
        assert_eq!(parsed["peaks"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["global_peak"]["building"], "BldgA");
        assert_eq!(parsed["global_peak"]["energy_kwh"], 5.0);

        let empty: Value = serde_json::from_str(&JsonFormatter.format_peaks(&[], None)).unwrap();
        assert!(empty["global_peak"].is_null());
    }

    #[test]
    fn test_json_formatter_weekly_includes_convention() {
        let output = JsonFormatter.format_weekly(&[], &Totals::default(), WeekStart::Sunday);
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["week_start"], "sunday");
    }

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter(true).format_summary(&[]).contains("\"summary\""));
        assert!(get_formatter(false).format_summary(&[]).contains("Building"));
    }
}

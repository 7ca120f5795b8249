//! Integration tests for meterstat

mod common;

use common::{MeterRecordBuilder, TEST_BUILDINGS, assert_approx_eq, generate_campus_records};
use meterstat::{
    aggregation::{Aggregator, RawRecord},
    aggregation_types::Totals,
    error::MeterstatError,
    ledger::BuildingLedger,
    output::{OutputFormatter, TableFormatter, get_formatter},
};

#[test]
fn test_ledger_and_aggregator_agree() {
    let records = generate_campus_records(14);
    let ledger = BuildingLedger::from_records(&records);

    let mut ledger_summaries = ledger.summaries();
    ledger_summaries.sort_by(|a, b| a.building.cmp(&b.building));
    let batch_summaries = Aggregator::summarize(&records);
    assert_eq!(ledger_summaries.len(), TEST_BUILDINGS.len());

    for (from_ledger, from_batch) in ledger_summaries.iter().zip(&batch_summaries) {
        assert_eq!(from_ledger.building, from_batch.building);
        assert_eq!(from_ledger.count, from_batch.count);
        assert_approx_eq(from_ledger.sum, from_batch.sum, 1e-9);
        assert_eq!(from_ledger.min, from_batch.min);
        assert_eq!(from_ledger.max, from_batch.max);
    }

    let mut ledger_peaks = ledger.peaks();
    ledger_peaks.sort_by(|a, b| a.building.cmp(&b.building));
    assert_eq!(ledger_peaks, Aggregator::peaks_by_building(&records));
}

#[test]
fn test_building_peak_tie_goes_to_earliest() {
    let records = vec![
        MeterRecordBuilder::new().with_time(2024, 1, 3, 9).with_energy(8.0).build(),
        MeterRecordBuilder::new().with_time(2024, 1, 1, 9).with_energy(8.0).build(),
        MeterRecordBuilder::new().with_time(2024, 1, 2, 9).with_energy(2.0).build(),
    ];

    let peaks = Aggregator::peaks_by_building(&records);
    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].timestamp.to_string(), "2024-01-01 09:00:00");

    let ledger = BuildingLedger::from_records(&records);
    let peak = ledger.building(TEST_BUILDINGS[0]).unwrap().peak().unwrap();
    assert_eq!(peak.timestamp.to_string(), "2024-01-01 09:00:00");
}

#[test]
fn test_highest_consumer_and_overview() {
    let records = vec![
        MeterRecordBuilder::new().with_building("Gym").with_energy(4.0).build(),
        MeterRecordBuilder::new()
            .with_building("Library")
            .with_offset_hours(1)
            .with_energy(3.0)
            .build(),
        MeterRecordBuilder::new()
            .with_building("Library")
            .with_offset_hours(2)
            .with_energy(3.0)
            .build(),
    ];

    let overview = Aggregator::campus_overview(&records).unwrap();
    assert_eq!(overview.total_kwh, 10.0);
    assert_eq!(overview.highest_building.as_str(), "Library");
    assert_eq!(overview.peak.building.as_str(), "Gym");
    assert_eq!(overview.peak.energy_kwh, 4.0);
}

#[test]
fn test_normalize_rejects_bad_rows() {
    let result = Aggregator::normalize(vec![
        RawRecord::new("Gym", "2024-01-01 10:00", "1.0"),
        RawRecord::new("Gym", "yesterday", "1.0"),
    ]);
    assert!(matches!(result, Err(MeterstatError::InvalidTimestamp(_))));

    let result = Aggregator::normalize(vec![RawRecord::new("Gym", "2024-01-01", "lots")]);
    assert!(matches!(result, Err(MeterstatError::InvalidEnergy(_))));
}

#[test]
fn test_weekly_averages() {
    let records = generate_campus_records(14);
    let weekly = Aggregator::default().aggregate_weekly(&records);
    let averages = Aggregator::average_bucket_totals(&weekly);

    assert_eq!(averages.len(), TEST_BUILDINGS.len());
    for average in &averages {
        // 2024-01-01 is a Monday, so 14 days are exactly two weeks
        assert_eq!(average.buckets, 2);
        let total: f64 = weekly
            .iter()
            .filter(|b| b.building == average.building)
            .map(|b| b.total_kwh)
            .sum();
        assert_approx_eq(average.average_kwh, total / 2.0, 1e-9);
    }

    let table = TableFormatter.format_averages(&averages);
    for building in TEST_BUILDINGS {
        assert!(table.contains(building));
    }
}

#[test]
fn test_json_output_parses() {
    let records = generate_campus_records(2);
    let daily = Aggregator::default().aggregate_daily(&records);
    let totals = Totals::from_buckets(&daily);
    let formatter = get_formatter(true);

    let daily_json: serde_json::Value =
        serde_json::from_str(&formatter.format_daily(&daily, &totals)).unwrap();
    assert_eq!(daily_json["daily"].as_array().unwrap().len(), daily.len());
    assert_eq!(daily_json["totals"]["buckets"], daily.len());

    let summary_json: serde_json::Value =
        serde_json::from_str(&formatter.format_summary(&Aggregator::summarize(&records)))
            .unwrap();
    assert_eq!(
        summary_json["summary"].as_array().unwrap().len(),
        TEST_BUILDINGS.len()
    );

    let reports = BuildingLedger::from_records(&records).generate_all_reports();
    let reports_json: serde_json::Value =
        serde_json::from_str(&formatter.format_building_reports(&reports)).unwrap();
    assert_eq!(reports_json["reports"][0], reports[0].as_str());
}

//! meterstat - Aggregate building electricity meter readings from CSV files

use meterstat::{
    aggregation::{AggregationConfig, Aggregator},
    aggregation_types::Totals,
    cli::{Cli, Command},
    data_loader::DataLoader,
    error::Result,
    export::Exporter,
    ledger::BuildingLedger,
    output::{CampusReport, OutputFormatter, TableFormatter, get_formatter},
    types::MeterRecord,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Render the full campus report
///
/// Fails with `EmptyDataset` when there are no readings to report on.
fn render_campus_report(
    aggregator: &Aggregator,
    records: &[MeterRecord],
    formatter: &dyn OutputFormatter,
    include_buildings: bool,
) -> Result<String> {
    let overview = Aggregator::campus_overview(records)?;
    let weekly = aggregator.aggregate_weekly(records);
    let daily = aggregator.aggregate_daily(records);
    let building_reports = if include_buildings {
        BuildingLedger::from_records(records).generate_all_reports()
    } else {
        Vec::new()
    };

    Ok(formatter.format_campus_report(&CampusReport {
        overview: &overview,
        weekly: &weekly,
        daily: &daily,
        building_reports: &building_reports,
    }))
}

fn main() -> Result<()> {
    // Parse CLI arguments first to check for quiet flag
    let cli = Cli::parse();

    // Initialize logging. The --quiet flag should override RUST_LOG.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("meterstat=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Progress bars only make sense for interactive table output
    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let loaded = DataLoader::new(&cli.data_dir)?
        .with_progress(show_progress)
        .load_records()?;
    let records = loaded.records;

    let aggregator =
        Aggregator::new(AggregationConfig::default().with_week_start(cli.start_of_week));
    let formatter = get_formatter(cli.json);

    match cli.command_or_default() {
        Command::Report(args) => {
            info!("Running campus report");
            let report = render_campus_report(
                &aggregator,
                &records,
                formatter.as_ref(),
                !args.no_building_reports,
            )?;
            println!("{report}");
        }
        Command::Daily => {
            info!("Running daily totals");
            let daily = aggregator.aggregate_daily(&records);
            let totals = Totals::from_buckets(&daily);
            println!("{}", formatter.format_daily(&daily, &totals));
        }
        Command::Weekly(args) => {
            info!("Running weekly totals (weeks start on {})", cli.start_of_week);
            let weekly = aggregator.aggregate_weekly(&records);
            if args.average {
                let averages = Aggregator::average_bucket_totals(&weekly);
                println!("{}", formatter.format_averages(&averages));
            } else {
                let totals = Totals::from_buckets(&weekly);
                println!(
                    "{}",
                    formatter.format_weekly(&weekly, &totals, cli.start_of_week)
                );
            }
        }
        Command::Summary => {
            info!("Running building summary");
            let summaries = Aggregator::summarize(&records);
            println!("{}", formatter.format_summary(&summaries));
        }
        Command::Peaks => {
            info!("Running peak report");
            let peaks = Aggregator::peaks_by_building(&records);
            let global = Aggregator::global_peak(&records).ok();
            println!("{}", formatter.format_peaks(&peaks, global.as_ref()));
        }
        Command::Buildings => {
            info!("Running building reports");
            let ledger = BuildingLedger::from_records(&records);
            println!(
                "{}",
                formatter.format_building_reports(&ledger.generate_all_reports())
            );
        }
        Command::Export(args) => {
            info!("Exporting results to {}", args.output_dir.display());
            let exporter = Exporter::new(&args.output_dir)?;
            let summaries = Aggregator::summarize(&records);
            let report = render_campus_report(&aggregator, &records, &TableFormatter, true)?;
            let files = exporter.export_all(&records, &summaries, &report)?;

            println!("Cleaned data saved to {}", files.cleaned_data.display());
            println!("Building summary saved to {}", files.building_summary.display());
            println!("Report saved to {}", files.summary_text.display());
        }
    }

    Ok(())
}

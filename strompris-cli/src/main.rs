//! Strompris CLI: spot-price queries, dataset updater and dataset inspection.
//!
//! Commands:
//! - `prices`: fetch a zone's prices for a date range
//! - `now`: current-hour price per zone
//! - `update`: append one day for every zone to the CSV dataset
//! - `dataset status`: row counts and coverage per zone
//! - `dataset means`: daily mean price per zone from the dataset

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use strompris_core::data::{
    csv_row, update_dataset, AggregateError, DatasetStore, DayFailure, HvaKosterStrommen,
    RangeAggregator, RangeReport, StdoutProgress,
};
use strompris_core::stats::{current_record, daily_means, PriceSummary};
use strompris_core::{Currency, StromprisConfig, Zone};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "strompris",
    version,
    about = "Strompris CLI: Norwegian electricity spot prices"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices for one zone over a date range.
    Prices {
        /// Price zone (NO1..NO5).
        #[arg(long)]
        zone: Zone,

        /// Start date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to the start date.
        #[arg(long)]
        end: Option<String>,

        /// NOK or EUR. Defaults to the configured dashboard currency.
        #[arg(long)]
        currency: Option<Currency>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the current-hour price per zone.
    Now {
        /// Zones to show (repeatable). Defaults to all five.
        #[arg(long)]
        zone: Vec<Zone>,

        #[arg(long)]
        currency: Option<Currency>,
    },
    /// Append one day of prices for every zone to the dataset.
    Update {
        /// Day to fetch (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Dataset CSV file. Defaults to the configured path.
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Dataset inspection commands.
    Dataset {
        #[command(subcommand)]
        action: DatasetAction,
    },
}

#[derive(Subcommand)]
enum DatasetAction {
    /// Report row counts and date coverage per zone.
    Status {
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Daily mean price per zone.
    Means {
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Only this zone.
        #[arg(long)]
        zone: Option<Zone>,

        #[arg(long)]
        currency: Option<Currency>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("strompris=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StromprisConfig::load(cli.config.as_deref()).context("loading configuration")?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Prices {
            zone,
            start,
            end,
            currency,
            format,
        } => run_prices(
            &config,
            zone,
            start.as_deref(),
            end.as_deref(),
            currency.unwrap_or(config.dashboard.currency),
            format,
        ),
        Commands::Now { zone, currency } => {
            run_now(&config, zone, currency.unwrap_or(config.dashboard.currency))
        }
        Commands::Update { date, dataset } => run_update(&config, date.as_deref(), dataset),
        Commands::Dataset { action } => match action {
            DatasetAction::Status { dataset } => {
                run_dataset_status(&dataset_path(&config, dataset))
            }
            DatasetAction::Means {
                dataset,
                zone,
                currency,
            } => run_dataset_means(
                &dataset_path(&config, dataset),
                zone,
                currency.unwrap_or(config.dashboard.currency),
            ),
        },
    }
}

fn aggregator(config: &StromprisConfig) -> Result<RangeAggregator<HvaKosterStrommen>> {
    let source = HvaKosterStrommen::new(&config.source).context("building HTTP client")?;
    Ok(RangeAggregator::new(source))
}

fn dataset_path(config: &StromprisConfig, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| config.dataset.path.clone())
}

fn run_prices(
    config: &StromprisConfig,
    zone: Zone,
    start: Option<&str>,
    end: Option<&str>,
    currency: Currency,
    format: OutputFormat,
) -> Result<()> {
    let (start, end) = resolve_range(start, end, Local::now().date_naive())?;
    let mut agg = aggregator(config)?;

    let report = match agg.fetch_range(start, end, zone) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            if let AggregateError::DataAbsent { failures, .. } = &e {
                print_failures(failures);
            }
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Table => write_table(&mut out, &report, currency)?,
        OutputFormat::Csv => write_csv(&mut out, &report)?,
        OutputFormat::Json => write_json(&mut out, &report, currency)?,
    }
    out.flush()?;

    print_failures(&report.failures);
    Ok(())
}

fn run_now(config: &StromprisConfig, zones: Vec<Zone>, currency: Currency) -> Result<()> {
    let zones = if zones.is_empty() {
        Zone::ALL.to_vec()
    } else {
        zones
    };
    let today = Local::now().date_naive();
    let now = Utc::now();
    let mut agg = aggregator(config)?;

    let mut failed = 0;
    println!("{:<28} {:>14}  Interval", "Zone", format!("{currency}/kWh"));
    println!("{}", "-".repeat(64));
    for (zone, result) in agg.fetch_zones(today, today, &zones) {
        let hit = result
            .as_ref()
            .ok()
            .and_then(|report| current_record(&report.series, now));
        match (hit, result.as_ref()) {
            (Some(r), _) => println!(
                "{:<28} {:>14.4}  {} - {}",
                zone.label(),
                r.price(currency),
                r.time_start.format("%H:%M"),
                r.time_end.format("%H:%M"),
            ),
            (None, Ok(_)) => {
                failed += 1;
                eprintln!("{zone}: no interval covers the current time");
            }
            (None, Err(e)) => {
                failed += 1;
                eprintln!("{zone}: {e}");
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_update(
    config: &StromprisConfig,
    date: Option<&str>,
    dataset: Option<PathBuf>,
) -> Result<()> {
    let date = match date {
        Some(s) => parse_date(s)?,
        None => Local::now().date_naive(),
    };
    let source = HvaKosterStrommen::new(&config.source).context("building HTTP client")?;
    let store = DatasetStore::new(dataset_path(config, dataset));

    println!("Updating {} for {date}", store.path().display());
    let summary = update_dataset(&source, &store, date, &Zone::ALL, &StdoutProgress);
    println!("Rows appended: {}", summary.rows_appended);

    if !summary.all_succeeded() {
        for (zone, err) in &summary.errors {
            eprintln!("Error for {zone}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_dataset_status(path: &Path) -> Result<()> {
    let store = DatasetStore::new(path);
    let status = store
        .status()
        .with_context(|| format!("reading dataset {}", path.display()))?;

    if !status.exists {
        println!("Dataset does not exist: {}", path.display());
        return Ok(());
    }
    if status.total_rows == 0 {
        println!("Dataset is empty: {}", path.display());
        return Ok(());
    }

    println!("Dataset: {}", path.display());
    println!("Rows: {}", status.total_rows);
    println!();
    println!("{:<6} {:>8}  {:<25} {:<25}", "Zone", "Rows", "First", "Last");
    println!("{}", "-".repeat(68));
    for z in &status.zones {
        println!(
            "{:<6} {:>8}  {:<25} {:<25}",
            z.zone,
            z.rows,
            z.first_start.to_rfc3339(),
            z.last_start.to_rfc3339(),
        );
    }

    Ok(())
}

fn run_dataset_means(path: &Path, zone: Option<Zone>, currency: Currency) -> Result<()> {
    let records = DatasetStore::new(path)
        .load()
        .with_context(|| format!("reading dataset {}", path.display()))?;

    let selected = records.iter().filter(|r| zone.map_or(true, |z| r.zone == z));
    let means = daily_means(selected);
    if means.is_empty() {
        println!("No rows in {}", path.display());
        return Ok(());
    }

    println!(
        "{:<6} {:<12} {:>14} {:>10}",
        "Zone",
        "Date",
        format!("{currency}/kWh"),
        "Intervals"
    );
    println!("{}", "-".repeat(45));
    for m in &means {
        println!(
            "{:<6} {:<12} {:>14.4} {:>10}",
            m.zone,
            m.date,
            m.price(currency),
            m.intervals
        );
    }

    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

/// Start defaults to `today`, end defaults to start. Ordering is checked
/// by the aggregator.
fn resolve_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let start = start.map(parse_date).transpose()?.unwrap_or(today);
    let end = end.map(parse_date).transpose()?.unwrap_or(start);
    Ok((start, end))
}

fn print_failures(failures: &[DayFailure]) {
    for f in failures {
        eprintln!("{}", format_failure(f));
    }
}

fn format_failure(f: &DayFailure) -> String {
    format!("WARNING: {} {} missing: {}", f.zone, f.date, f.error)
}

fn write_table(out: &mut impl Write, report: &RangeReport, currency: Currency) -> Result<()> {
    writeln!(
        out,
        "{} {} to {} ({} intervals)",
        report.zone.label(),
        report.start,
        report.end,
        report.series.len()
    )?;
    writeln!(out)?;
    writeln!(out, "{:<27} {:<27} {:>12}", "Start", "End", format!("{currency}/kWh"))?;
    writeln!(out, "{}", "-".repeat(68))?;
    for r in &report.series {
        writeln!(
            out,
            "{:<27} {:<27} {:>12.4}",
            r.time_start.to_rfc3339(),
            r.time_end.to_rfc3339(),
            r.price(currency)
        )?;
    }

    if let Some(summary) = PriceSummary::of(&report.series, currency) {
        writeln!(out)?;
        writeln!(out, "{}", format_summary(&summary))?;
    }
    Ok(())
}

fn format_summary(s: &PriceSummary) -> String {
    format!(
        "min {:.4} ({})  mean {:.4}  max {:.4} ({})  {}/kWh",
        s.min,
        s.min_at.format("%Y-%m-%d %H:%M"),
        s.mean,
        s.max,
        s.max_at.format("%Y-%m-%d %H:%M"),
        s.currency
    )
}

fn write_csv(out: &mut impl Write, report: &RangeReport) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(strompris_core::data::dataset::COLUMNS)?;
    for r in &report.series {
        wtr.write_record(csv_row(r))?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json(out: &mut impl Write, report: &RangeReport, currency: Currency) -> Result<()> {
    let failed: Vec<_> = report
        .failures
        .iter()
        .map(|f| {
            serde_json::json!({
                "date": f.date,
                "url": f.error.url(),
                "status": f.error.status(),
                "error": f.error.to_string(),
            })
        })
        .collect();

    let doc = serde_json::json!({
        "zone": report.zone,
        "start": report.start,
        "end": report.end,
        "currency": currency,
        "summary": PriceSummary::of(&report.series, currency),
        "records": report.series,
        "failed_days": failed,
    });
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)?;
    Ok(())
}

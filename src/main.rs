//! Premium Reporting CLI
//!
//! Projects a file of contract events through the reporting year and prints
//! the monthly portfolio report

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use premium_reporting::events::{load_events, load_events_json};
use premium_reporting::reports::{format_report_table, report_for_events, write_reports_csv, write_summaries_csv};
use premium_reporting::ProjectionConfig;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EventFormat {
    Csv,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "premium_reporting", version, about = "Monthly premium report from contract events")]
struct Cli {
    /// Event file (CSV with Event,ContractId,Amount,Date columns, or a JSON array)
    #[arg(short, long, default_value = "data/sample_events.csv")]
    events: PathBuf,

    /// Event file format; inferred from the extension when omitted
    #[arg(long, value_enum)]
    format: Option<EventFormat>,

    /// Reject events outside this calendar year
    #[arg(short, long)]
    year: Option<i32>,

    /// Write the report rows to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write per-contract monthly summaries to this CSV file
    #[arg(long)]
    summaries: Option<PathBuf>,

    /// Fold contracts on a single thread
    #[arg(long)]
    sequential: bool,
}

fn detect_format(path: &Path) -> EventFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => EventFormat::Json,
        _ => EventFormat::Csv,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let format = cli.format.unwrap_or_else(|| detect_format(&cli.events));
    println!("Loading events from {}...", cli.events.display());

    let events = match format {
        EventFormat::Csv => load_events(&cli.events),
        EventFormat::Json => load_events_json(&cli.events),
    }
    .with_context(|| format!("Failed to load events from {}", cli.events.display()))?;
    println!("Loaded {} events in {:?}", events.len(), start.elapsed());

    let config = ProjectionConfig {
        reporting_year: cli.year,
        parallel: !cli.sequential,
    };

    let run = report_for_events(&events, config).context("Event stream rejected")?;
    println!("Projected {} contracts\n", run.summaries.len());
    print!("{}", format_report_table(&run.reports));

    if let Some(path) = &cli.output {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        write_reports_csv(BufWriter::new(file), &run.reports)?;
        println!("\nReport written to: {}", path.display());
    }

    if let Some(path) = &cli.summaries {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        write_summaries_csv(BufWriter::new(file), run.summaries.values().flatten())?;
        println!("Summaries written to: {}", path.display());
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

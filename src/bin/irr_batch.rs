//! Solve the IRR of every series in a CSV file
//!
//! Input rows are `label,cf0,cf1,...`. Results go to stdout (or `--output`)
//! as CSV, or as JSON with `--json`.

use anyhow::{Context, Result};
use clap::Parser;
use irr_solver::cashflows::load_series;
use irr_solver::config::SolverOverrides;
use irr_solver::{BatchRunner, BatchSummary, SeriesOutcome, SolverConfig};
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "irr_batch", version, about = "Solve IRRs for a CSV of cash flow series")]
struct Args {
    /// CSV file, one series per row: label,cf0,cf1,...
    input: PathBuf,

    /// Write results here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit JSON (outcomes plus summary) instead of CSV
    #[arg(long)]
    json: bool,

    /// JSON file with solver parameters
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: SolverOverrides,

    /// Add an annualized rate column for this many periods per year
    #[arg(long)]
    periods_per_year: Option<u32>,
}

#[derive(Serialize)]
struct BatchResponse<'a> {
    summary: BatchSummary,
    outcomes: &'a [SeriesOutcome],
    execution_time_ms: u64,
}

fn write_csv<W: Write>(writer: W, outcomes: &[SeriesOutcome]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for outcome in outcomes {
        csv_writer.serialize(outcome)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let config = SolverConfig::resolve(args.config.as_deref(), &args.overrides)
        .context("Failed to load solver config")?;

    let series = load_series(&args.input)
        .with_context(|| format!("Failed to load cash flows from {}", args.input.display()))?;
    info!("Loaded {} series in {:?}", series.len(), start.elapsed());

    let mut runner = BatchRunner::new(config);
    if let Some(periods) = args.periods_per_year {
        runner = runner.with_periods_per_year(periods);
    }
    info!("Solver settings: {:?}", runner.config());
    let outcomes = runner.run_batch(&series);

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Unable to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    if args.json {
        let response = BatchResponse {
            summary: BatchSummary::from_outcomes(&outcomes),
            outcomes: &outcomes,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        serde_json::to_writer_pretty(writer, &response)?;
    } else {
        write_csv(writer, &outcomes)?;
    }

    info!("Finished in {:?}", start.elapsed());
    Ok(())
}

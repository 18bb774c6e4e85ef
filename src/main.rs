//! IRR CLI
//!
//! Solve the internal rate of return of one cash flow series:
//!
//! ```text
//! irr -- -100 39 59 55 20
//! irr --flows "-100,110" --periods-per-year 12 --json
//! ```
//!
//! Solver parameters come from defaults, then `--config`, then
//! `IRR_INITIAL_RATE` / `IRR_TOLERANCE` / `IRR_MAX_ITERATIONS`, then flags.

use anyhow::{bail, Context, Result};
use clap::Parser;
use irr_solver::cashflows::{parse_amounts, CashFlowSeries};
use irr_solver::config::SolverOverrides;
use irr_solver::{BatchRunner, SolverConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "irr", version, about = "Internal rate of return of periodic cash flows")]
struct Args {
    /// Cash flows by period, period 0 first
    #[arg(allow_negative_numbers = true)]
    cashflows: Vec<f64>,

    /// Cash flows as one comma-separated list (alternative to positional values)
    #[arg(long, conflicts_with = "cashflows")]
    flows: Option<String>,

    /// JSON file with solver parameters
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: SolverOverrides,

    /// Also report the effective annual rate for this many periods per year
    #[arg(long)]
    periods_per_year: Option<u32>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn run(args: Args) -> Result<bool> {
    let config = SolverConfig::resolve(args.config.as_deref(), &args.overrides)
        .context("Failed to load solver config")?;

    let amounts = match &args.flows {
        Some(text) => parse_amounts(text).context("Invalid --flows list")?,
        None if args.cashflows.is_empty() => {
            bail!("No cash flows given; pass them as arguments or with --flows")
        }
        None => args.cashflows.clone(),
    };

    let mut runner = BatchRunner::new(config);
    if let Some(periods) = args.periods_per_year {
        runner = runner.with_periods_per_year(periods);
    }

    let outcome = runner.run(&CashFlowSeries::unlabeled(amounts));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if let Some(rate) = outcome.rate {
        println!("IRR: {:.6} ({:.4}% per period)", rate, rate * 100.0);
        if let Some(annual) = outcome.annualized_rate {
            println!("Annualized: {:.6} ({:.4}%)", annual, annual * 100.0);
        }
        if let Some(iterations) = outcome.iterations {
            println!("Converged after {} iterations", iterations);
        }
    } else if let Some(error) = &outcome.error {
        eprintln!("No IRR: {}", error);
    }

    Ok(outcome.is_solved())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

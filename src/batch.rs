//! Batch runner for solving many cash flow series
//!
//! Holds one solver configuration and applies it to every series. Series are
//! independent, so batches are solved in parallel.

use crate::cashflows::CashFlowSeries;
use crate::config::SolverConfig;
use crate::irr::{IrrError, IrrSolution};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result row for one series, flattened for CSV/JSON output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesOutcome {
    pub label: String,
    pub periods: usize,
    /// Periodic IRR, if converged
    pub rate: Option<f64>,
    /// Effective annual IRR when the runner has `periods_per_year` set
    pub annualized_rate: Option<f64>,
    pub iterations: Option<u32>,
    /// NPV residual at `rate`
    pub npv: Option<f64>,
    /// Reason code when no rate was found
    pub error_code: Option<String>,
    pub error: Option<String>,
}

impl SeriesOutcome {
    fn solved(series: &CashFlowSeries, solution: &IrrSolution, periods_per_year: Option<u32>) -> Self {
        Self {
            label: series.label.clone(),
            periods: series.len(),
            rate: Some(solution.rate),
            annualized_rate: periods_per_year.map(|p| solution.annualized(p)),
            iterations: Some(solution.iterations),
            npv: Some(solution.npv),
            error_code: None,
            error: None,
        }
    }

    fn failed(series: &CashFlowSeries, err: &IrrError) -> Self {
        Self {
            label: series.label.clone(),
            periods: series.len(),
            rate: None,
            annualized_rate: None,
            iterations: None,
            npv: None,
            error_code: Some(err.code().to_string()),
            error: Some(err.to_string()),
        }
    }

    pub fn is_solved(&self) -> bool {
        self.rate.is_some()
    }
}

/// Counts over a batch of outcomes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub solved: usize,
    pub failed: usize,
    /// Failures keyed by reason code
    pub failures_by_reason: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[SeriesOutcome]) -> Self {
        let mut summary = BatchSummary {
            total: outcomes.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            match &outcome.error_code {
                None => summary.solved += 1,
                Some(code) => {
                    summary.failed += 1;
                    *summary.failures_by_reason.entry(code.clone()).or_insert(0) += 1;
                }
            }
        }

        summary
    }
}

/// Solves cash flow series with a fixed configuration
///
/// # Example
/// ```ignore
/// let runner = BatchRunner::new(SolverConfig::from_env()).with_periods_per_year(12);
/// let outcomes = runner.run_batch(&load_series("deals.csv")?);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    config: SolverConfig,
    periods_per_year: Option<u32>,
}

impl BatchRunner {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            periods_per_year: None,
        }
    }

    /// Also report an effective annual rate for this compounding frequency
    pub fn with_periods_per_year(mut self, periods_per_year: u32) -> Self {
        self.periods_per_year = Some(periods_per_year);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve a single series
    pub fn run(&self, series: &CashFlowSeries) -> SeriesOutcome {
        match series.solve(&self.config) {
            Ok(solution) => {
                debug!(
                    "{}: rate {:.6} after {} iterations (npv {:.2e})",
                    series.label, solution.rate, solution.iterations, solution.npv
                );
                SeriesOutcome::solved(series, &solution, self.periods_per_year)
            }
            Err(err) => {
                warn!("{}: {}", series.label, err);
                SeriesOutcome::failed(series, &err)
            }
        }
    }

    /// Solve every series in parallel, preserving input order
    pub fn run_batch(&self, series: &[CashFlowSeries]) -> Vec<SeriesOutcome> {
        let outcomes: Vec<SeriesOutcome> = series.par_iter().map(|s| self.run(s)).collect();

        let summary = BatchSummary::from_outcomes(&outcomes);
        info!(
            "Solved {} of {} series ({} failed)",
            summary.solved, summary.total, summary.failed
        );

        outcomes
    }
}

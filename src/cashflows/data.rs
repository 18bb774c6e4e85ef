//! Cash flow series record

use crate::config::SolverConfig;
use crate::irr::{solve_irr_with, IrrSolution, SolveResult};
use serde::{Deserialize, Serialize};

/// A labeled series of periodic cash flows.
///
/// `amounts[t]` is the net flow at period `t`; period 0 is usually the
/// initial outlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSeries {
    /// Identifier carried through to results (row label in CSV input)
    pub label: String,

    /// Net amount per period
    pub amounts: Vec<f64>,
}

impl CashFlowSeries {
    pub fn new(label: impl Into<String>, amounts: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            amounts,
        }
    }

    /// Series without a meaningful label (e.g. typed on the command line)
    pub fn unlabeled(amounts: Vec<f64>) -> Self {
        Self::new("", amounts)
    }

    /// Number of periods, including period 0
    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Solve this series' IRR
    pub fn solve(&self, config: &SolverConfig) -> SolveResult<IrrSolution> {
        solve_irr_with(&self.amounts, config)
    }
}

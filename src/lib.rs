//! IRR Solver - Internal Rate of Return for periodic cash flows
//!
//! This library provides:
//! - NPV and NPV-derivative functions for uniformly spaced cash flows
//! - A Newton-Raphson IRR solver with a lower-boundary safeguard and tagged failure reasons
//! - Solver configuration from defaults, environment, or JSON
//! - CSV loading and parallel batch solving of many series

pub mod irr;
pub mod config;
pub mod cashflows;
pub mod batch;

// Re-export commonly used types
pub use irr::{calculate_irr, solve_irr, solve_irr_with, IrrError, IrrSolution, SolveResult};
pub use config::{ConfigError, SolverConfig, SolverOverrides};
pub use cashflows::CashFlowSeries;
pub use batch::{BatchRunner, BatchSummary, SeriesOutcome};

//! Internal Rate of Return (IRR) via Newton-Raphson

mod error;
mod npv;
mod solver;

pub use error::{IrrError, SolveResult};
pub use npv::{npv, npv_derivative};
pub use solver::{
    annualize_rate, calculate_irr, solve_irr, solve_irr_with, validate_cashflows, IrrSolution,
};

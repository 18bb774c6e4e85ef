//! Failure outcomes of the IRR solver

use thiserror::Error;

/// Result alias for solver operations
pub type SolveResult<T> = Result<T, IrrError>;

/// Reasons the solver produced no usable rate.
///
/// None of these are fatal: they are returned to the caller, which decides
/// how to surface them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrrError {
    /// Series is empty, non-finite, or lacks both a positive and a negative entry
    #[error("Invalid cash flows: {reason}")]
    InvalidInput { reason: String },

    /// Solver parameters are unusable (rate at or below -100%, non-positive tolerance, ...)
    #[error("Invalid solver configuration: {reason}")]
    InvalidConfig { reason: String },

    /// NPV slope fell below tolerance, so the Newton step is undefined
    #[error("Derivative too close to zero at rate {rate:.6} (npv' = {derivative:.2e}, iteration {iteration})")]
    FlatDerivative {
        rate: f64,
        derivative: f64,
        iteration: u32,
    },

    /// Lower-boundary safeguard could not move the rate below its current value
    #[error("Rate moving in an unexpected direction near -100% (rate {rate:.6}, iteration {iteration})")]
    DivergentDirection { rate: f64, iteration: u32 },

    /// Iteration budget exhausted
    #[error("Did not converge after {iterations} iterations (last rate {rate:.6}, residual {residual:.2e})")]
    NoConvergence {
        iterations: u32,
        rate: f64,
        residual: f64,
    },
}

impl IrrError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable reason code for serialized output
    pub fn code(&self) -> &'static str {
        match self {
            IrrError::InvalidInput { .. } => "invalid_input",
            IrrError::InvalidConfig { .. } => "invalid_config",
            IrrError::FlatDerivative { .. } => "flat_derivative",
            IrrError::DivergentDirection { .. } => "divergent_direction",
            IrrError::NoConvergence { .. } => "no_convergence",
        }
    }
}

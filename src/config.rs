//! Solver configuration
//!
//! Defaults reproduce the reference numerical behavior. Every field can be
//! overridden from the environment, a JSON file, or code.

use crate::irr::{IrrError, SolveResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Starting guess for the periodic rate (10%)
pub const DEFAULT_INITIAL_RATE: f64 = 0.10;

/// Convergence threshold on |NPV|, also the minimum usable |NPV'|
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Newton iteration budget
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Errors reading a JSON config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_initial_rate() -> f64 { DEFAULT_INITIAL_RATE }
fn default_tolerance() -> f64 { DEFAULT_TOLERANCE }
fn default_max_iterations() -> u32 { DEFAULT_MAX_ITERATIONS }

/// Newton-Raphson parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Initial periodic rate estimate (must be > -1)
    #[serde(default = "default_initial_rate")]
    pub initial_rate: f64,

    /// |NPV| below this is converged; |NPV'| below this is a flat derivative
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Maximum number of Newton iterations
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_rate: DEFAULT_INITIAL_RATE,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    pub fn with_initial_rate(mut self, initial_rate: f64) -> Self {
        self.initial_rate = initial_rate;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Read overrides from `IRR_INITIAL_RATE`, `IRR_TOLERANCE` and `IRR_MAX_ITERATIONS`.
    /// Missing or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Apply environment overrides on top of `self`
    pub fn merge_env(self) -> Self {
        Self {
            initial_rate: env::var("IRR_INITIAL_RATE")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(self.initial_rate),
            tolerance: env::var("IRR_TOLERANCE")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(self.tolerance),
            max_iterations: env::var("IRR_MAX_ITERATIONS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(self.max_iterations),
        }
    }

    /// Parse a JSON config; omitted fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a JSON config file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&contents)?)
    }

    /// Layer the optional JSON file, then the environment, then explicit
    /// overrides on top of the defaults
    pub fn resolve(file: Option<&Path>, overrides: &SolverOverrides) -> Result<Self, ConfigError> {
        let base = match file {
            Some(path) => Self::from_json_path(path)?,
            None => Self::default(),
        };

        Ok(overrides.apply(base.merge_env()))
    }

    /// Check that the parameters can drive the iteration
    pub fn validate(&self) -> SolveResult<()> {
        if !self.initial_rate.is_finite() || self.initial_rate <= -1.0 {
            return Err(IrrError::invalid_config(format!(
                "initial rate must be finite and greater than -1, got {}",
                self.initial_rate
            )));
        }

        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(IrrError::invalid_config(format!(
                "tolerance must be finite and positive, got {}",
                self.tolerance
            )));
        }

        if self.max_iterations == 0 {
            return Err(IrrError::invalid_config("max iterations must be at least 1"));
        }

        Ok(())
    }
}

/// Command-line solver flags shared by the binaries
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct SolverOverrides {
    /// Initial rate estimate
    #[arg(long, allow_negative_numbers = true)]
    pub initial_rate: Option<f64>,

    /// Convergence tolerance on |NPV|
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Iteration budget
    #[arg(long)]
    pub max_iterations: Option<u32>,
}

impl SolverOverrides {
    /// Replace the fields of `config` that were given explicitly
    pub fn apply(&self, mut config: SolverConfig) -> SolverConfig {
        if let Some(rate) = self.initial_rate {
            config.initial_rate = rate;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        config
    }
}

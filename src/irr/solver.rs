//! Newton-Raphson IRR iteration
//!
//! Pure and synchronous: no I/O, no shared state, bounded by the
//! configured iteration budget.

use super::error::{IrrError, SolveResult};
use super::npv::{npv, npv_derivative};
use crate::config::SolverConfig;
use serde::Serialize;

/// Lower target for the damped step when a Newton update crosses -100%
const DAMPING_TARGET: f64 = -0.99;

/// A converged IRR
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IrrSolution {
    /// Periodic rate as a decimal (0.05 = 5% per period)
    pub rate: f64,
    /// Newton updates applied before convergence
    pub iterations: u32,
    /// NPV at `rate`, |npv| < tolerance
    pub npv: f64,
}

impl IrrSolution {
    /// Effective annual rate for `periods_per_year` compounding periods
    pub fn annualized(&self, periods_per_year: u32) -> f64 {
        annualize_rate(self.rate, periods_per_year)
    }
}

/// Convert a periodic rate to an effective annual rate: (1 + r)^p - 1.
/// Zero periods per year is treated as one.
pub fn annualize_rate(periodic_rate: f64, periods_per_year: u32) -> f64 {
    (1.0 + periodic_rate).powf(f64::from(periods_per_year.max(1))) - 1.0
}

/// Check a cash flow series is usable: non-empty, finite, with at least one
/// strictly positive and one strictly negative amount
pub fn validate_cashflows(cashflows: &[f64]) -> SolveResult<()> {
    if cashflows.is_empty() {
        return Err(IrrError::invalid_input("cash flows must be a non-empty series"));
    }

    if let Some(t) = cashflows.iter().position(|cf| !cf.is_finite()) {
        return Err(IrrError::invalid_input(format!(
            "cash flow at period {} is not a finite number",
            t
        )));
    }

    let has_positive = cashflows.iter().any(|&cf| cf > 0.0);
    let has_negative = cashflows.iter().any(|&cf| cf < 0.0);
    if !has_positive || !has_negative {
        return Err(IrrError::invalid_input(
            "IRR requires at least one positive and one negative cash flow",
        ));
    }

    Ok(())
}

/// Solve for the IRR with the default configuration
/// (initial rate 10%, tolerance 1e-6, 1000 iterations)
pub fn solve_irr(cashflows: &[f64]) -> SolveResult<IrrSolution> {
    solve_irr_with(cashflows, &SolverConfig::default())
}

/// Convenience wrapper returning only the periodic rate
pub fn calculate_irr(cashflows: &[f64]) -> Option<f64> {
    solve_irr(cashflows).ok().map(|solution| solution.rate)
}

/// Solve for the periodic IRR of `cashflows` using Newton-Raphson.
///
/// # Arguments
/// * `cashflows` - Amounts per period, index 0 undiscounted
/// * `config` - Starting guess, tolerance and iteration budget
///
/// # Returns
/// * `IrrSolution` whose rate satisfies `|npv(rate)| < tolerance` and `rate > -1`,
///   or the reason no rate was found
///
/// If an update would land at or below -100%, the step is replaced by a
/// half-step from the current rate toward -99%. If that does not move the
/// rate down, the iteration stops with `DivergentDirection`.
pub fn solve_irr_with(cashflows: &[f64], config: &SolverConfig) -> SolveResult<IrrSolution> {
    config.validate()?;
    validate_cashflows(cashflows)?;

    let tolerance = config.tolerance;
    let mut rate = config.initial_rate;

    for iteration in 0..config.max_iterations {
        let value = npv(rate, cashflows);

        if value.abs() < tolerance {
            return Ok(IrrSolution {
                rate,
                iterations: iteration,
                npv: value,
            });
        }

        let derivative = npv_derivative(rate, cashflows);
        if derivative.abs() < tolerance {
            return Err(IrrError::FlatDerivative {
                rate,
                derivative,
                iteration,
            });
        }

        let mut next_rate = rate - value / derivative;

        if next_rate <= -1.0 {
            next_rate = (rate + DAMPING_TARGET) / 2.0;
            if next_rate >= rate {
                return Err(IrrError::DivergentDirection { rate, iteration });
            }
        }

        // NaN here means the objective overflowed; stop rather than iterate on garbage
        if !next_rate.is_finite() {
            return Err(IrrError::NoConvergence {
                iterations: iteration + 1,
                rate,
                residual: value.abs(),
            });
        }

        rate = next_rate;
    }

    Err(IrrError::NoConvergence {
        iterations: config.max_iterations,
        rate,
        residual: npv(rate, cashflows).abs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn assert_valid_root(solution: &IrrSolution, cashflows: &[f64]) {
        assert!(solution.rate > -1.0, "rate {} not above -100%", solution.rate);
        assert!(npv(solution.rate, cashflows).abs() < 1e-6);
        assert_eq!(solution.npv, npv(solution.rate, cashflows));
    }

    #[test]
    fn test_single_period_ten_percent() {
        let cashflows = [-100.0, 110.0];
        let solution = solve_irr(&cashflows).unwrap();

        // Initial guess is already the root
        assert_eq!(solution.iterations, 0);
        assert_relative_eq!(solution.rate, 0.10, epsilon = 1e-9);
        assert_valid_root(&solution, &cashflows);
    }

    #[test]
    fn test_uneven_cashflows() {
        let cashflows = [-100.0, 39.0, 59.0, 55.0, 20.0];
        let solution = solve_irr(&cashflows).unwrap();

        assert_abs_diff_eq!(solution.rate, 0.2809, epsilon = 1e-3);
        assert!(solution.iterations > 0 && solution.iterations < 20);
        assert_valid_root(&solution, &cashflows);
    }

    #[test]
    fn test_loan_from_borrower_side() {
        // Receive 10000, repay 900 for 12 periods
        let mut cashflows = vec![10000.0];
        cashflows.extend(vec![-900.0; 12]);

        let solution = solve_irr(&cashflows).unwrap();
        assert!(solution.rate > 0.0 && solution.rate < 0.05);
        assert_valid_root(&solution, &cashflows);
    }

    #[test]
    fn test_invalid_inputs() {
        let cases: [&[f64]; 6] = [
            &[],
            &[5.0, 3.0],
            &[-5.0, -3.0],
            &[-100.0, 0.0, 0.0, 0.0],
            &[-50.0],
            &[0.0, 0.0],
        ];

        for cashflows in cases {
            let err = solve_irr(cashflows).unwrap_err();
            assert!(
                matches!(err, IrrError::InvalidInput { .. }),
                "{:?} gave {:?}",
                cashflows,
                err
            );
        }
    }

    #[test]
    fn test_non_finite_input() {
        let err = solve_irr(&[-100.0, f64::NAN, 120.0]).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
        assert!(err.to_string().contains("period 1"));

        assert!(solve_irr(&[f64::NEG_INFINITY, 120.0]).is_err());
    }

    #[test]
    fn test_invalid_config_checked_first() {
        let config = SolverConfig::default().with_initial_rate(-1.0);
        let err = solve_irr_with(&[], &config).unwrap_err();
        assert_eq!(err.code(), "invalid_config");
    }

    #[test]
    fn test_deterministic() {
        let cashflows = [-250.0, 80.0, 80.0, 80.0, 80.0];
        assert_eq!(solve_irr(&cashflows), solve_irr(&cashflows));

        let flat = [-1.0, 1e-9];
        assert_eq!(solve_irr(&flat), solve_irr(&flat));
    }

    #[test]
    fn test_flat_derivative() {
        // Tiny inflow: slope at 10% is ~8e-10
        let err = solve_irr(&[-1.0, 1e-9]).unwrap_err();
        match err {
            IrrError::FlatDerivative { rate, derivative, iteration } => {
                assert_eq!(rate, 0.10);
                assert_eq!(iteration, 0);
                assert!(derivative.abs() < 1e-6);
            }
            other => panic!("expected FlatDerivative, got {:?}", other),
        }
    }

    #[test]
    fn test_no_convergence_within_budget() {
        let cashflows = [-100.0, 39.0, 59.0, 55.0, 20.0];
        let config = SolverConfig::default().with_max_iterations(2);

        let err = solve_irr_with(&cashflows, &config).unwrap_err();
        match err {
            IrrError::NoConvergence { iterations, rate, residual } => {
                assert_eq!(iterations, 2);
                assert!(rate > 0.10);
                assert!(residual >= 1e-6);
            }
            other => panic!("expected NoConvergence, got {:?}", other),
        }
    }

    #[test]
    fn test_safeguard_recovers_to_root_near_minus_ninety() {
        // Root at -90%; the first Newton updates overshoot below -100%
        let cashflows = [10.0, -1.0];
        let solution = solve_irr(&cashflows).unwrap();

        assert_abs_diff_eq!(solution.rate, -0.9, epsilon = 1e-6);
        assert_valid_root(&solution, &cashflows);
    }

    #[test]
    fn test_safeguard_divergent_direction() {
        // At -99.5% the Newton step lands at -101.5%; the damped step toward
        // -99% would move the rate up, which is rejected
        let config = SolverConfig::default().with_initial_rate(-0.995);
        let err = solve_irr_with(&[1000.0, -1.0], &config).unwrap_err();

        assert_eq!(
            err,
            IrrError::DivergentDirection { rate: -0.995, iteration: 0 }
        );
    }

    #[test]
    fn test_safeguard_never_returns_rate_at_or_below_minus_one() {
        // Root at -99.9% is unreachable through the damped step from above
        let result = solve_irr(&[1000.0, -1.0]);
        match result {
            Ok(solution) => assert!(solution.rate > -1.0),
            Err(err) => assert_eq!(err.code(), "divergent_direction"),
        }
    }

    #[test]
    fn test_overflowing_step_stops_without_nan() {
        // At -99.99% the discounted amounts overflow to infinity, so the
        // Newton step is inf / inf
        let config = SolverConfig::default().with_initial_rate(-0.9999);
        let err = solve_irr_with(&[-1.0, 1e305, 1e305], &config).unwrap_err();

        match err {
            IrrError::NoConvergence { iterations, rate, residual } => {
                assert_eq!(iterations, 1);
                assert_eq!(rate, -0.9999);
                assert!(!rate.is_nan());
                assert!(residual.is_infinite());
            }
            other => panic!("expected NoConvergence, got {:?}", other),
        }
    }

    #[test]
    fn test_tighter_tolerance() {
        let cashflows = [-100.0, 39.0, 59.0, 55.0, 20.0];
        let config = SolverConfig::default().with_tolerance(1e-10);

        let solution = solve_irr_with(&cashflows, &config).unwrap();
        assert!(npv(solution.rate, &cashflows).abs() < 1e-10);
    }

    #[test]
    fn test_calculate_irr_option() {
        assert!(calculate_irr(&[-100.0, 110.0]).is_some());
        assert!(calculate_irr(&[5.0, 3.0]).is_none());
    }

    #[test]
    fn test_annualize_monthly() {
        // Investment of 1000 returning 1100 after 12 monthly periods
        let mut cashflows = vec![-1000.0];
        cashflows.extend(vec![0.0; 11]);
        cashflows.push(1100.0);

        let solution = solve_irr(&cashflows).unwrap();
        assert_abs_diff_eq!(solution.annualized(12), 0.10, epsilon = 1e-6);

        assert_relative_eq!(annualize_rate(0.05, 1), 0.05, epsilon = 1e-12);
        assert_relative_eq!(annualize_rate(0.05, 0), 0.05, epsilon = 1e-12);
        assert_relative_eq!(annualize_rate(0.01, 12), 1.01f64.powi(12) - 1.0, epsilon = 1e-12);

        // Huge period counts must not wrap into negative exponents
        assert_eq!(annualize_rate(0.0, u32::MAX), 0.0);
        assert!(annualize_rate(0.01, u32::MAX) > 0.0);
    }
}

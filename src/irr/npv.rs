//! NPV objective and its derivative with respect to the periodic rate
//!
//! Both are only defined for `rate > -1`; the solver never evaluates them
//! at or below that boundary.

/// Net present value of `cashflows` discounted at periodic `rate`.
///
/// `cashflows[t]` is the amount at the end of period `t`; period 0 is undiscounted.
pub fn npv(rate: f64, cashflows: &[f64]) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Derivative of [`npv`] with respect to `rate`.
///
/// The period 0 amount is constant in `rate` and contributes nothing.
pub fn npv_derivative(rate: f64, cashflows: &[f64]) -> f64 {
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate().skip(1) {
        dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
    }

    dnpv
}

//! Internal Rate of Return (IRR) calculation
//!
//! Used to turn an exit scenario's yearly cashflow series into an annual
//! return figure.

/// Hard cap on root-finder iterations; a series with no root fails fast.
const MAX_ITERATIONS: u32 = 100;
/// Convergence tolerance on the NPV itself.
const NPV_TOLERANCE: f64 = 1e-6;
/// Rate bracket searched for a root. -99 % to +1000 % annually.
const RATE_LOWER_BOUND: f64 = -0.99;
const RATE_UPPER_BOUND: f64 = 10.0;

/// Calculate the annual IRR for a yearly cashflow series (index 0 = year 0).
///
/// Uses Newton-Raphson with a bisection fallback over the bounded bracket.
/// Returns `None` when no IRR exists (no sign change in the series or no
/// root inside the bracket) — callers render a placeholder instead of a
/// misleading number.
pub fn annual_irr(cashflows: &[f64]) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }

    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Some(0.0);
    }

    // An IRR requires at least one inflow and one outflow.
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return None;
    }

    let mut rate = 0.1; // initial guess: 10 % annually
    for _ in 0..MAX_ITERATIONS {
        let (value, derivative) = npv_and_derivative(cashflows, rate);

        if value.abs() < NPV_TOLERANCE {
            return Some(rate);
        }
        if derivative.abs() < 1e-20 {
            // Derivative vanished, Newton step undefined.
            return irr_bisection(cashflows);
        }

        rate = (rate - value / derivative).clamp(RATE_LOWER_BOUND, RATE_UPPER_BOUND);
    }

    // Newton-Raphson did not converge, fall back to bisection.
    irr_bisection(cashflows)
}

/// Net present value of a yearly series at a given discount rate.
pub fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// NPV and its derivative with respect to the rate.
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut derivative = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        value += cf / discount;
        if t > 0 {
            derivative -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (value, derivative)
}

/// Bisection fallback over the fixed bracket.
fn irr_bisection(cashflows: &[f64]) -> Option<f64> {
    let mut low = RATE_LOWER_BOUND;
    let mut high = RATE_UPPER_BOUND;

    let npv_low = npv(cashflows, low);
    let npv_high = npv(cashflows, high);

    // Without a sign change there is no root in the bracket.
    if npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(cashflows, mid);

        if npv_mid.abs() < NPV_TOLERANCE || (high - low) / 2.0 < 1e-10 {
            return Some(mid);
        }

        if npv_mid * npv(cashflows, low) < 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    None
}

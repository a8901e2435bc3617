//! Annuity loan math: payment formula, max-loan inversion, yearly schedule

use serde::{Deserialize, Serialize};

use crate::error::{require_finite, require_non_negative, EngineError};

/// Terms of an annuity loan.
///
/// `annual_rate_pct` is a percent figure as entered in financing forms
/// (3.5 = 3.5 % nominal). A negative rate is floored to 0 rather than
/// compounded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate_pct: f64,
    pub term_years: u32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_pct: f64, term_years: u32) -> Self {
        Self {
            principal,
            annual_rate_pct,
            term_years,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        require_non_negative("principal", self.principal)?;
        require_finite("annual_rate_pct", self.annual_rate_pct)?;
        if self.term_years < 1 {
            return Err(EngineError::invalid("term_years", "must be >= 1"));
        }
        Ok(())
    }
}

/// One year of an amortization schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub year: u32,
    pub interest: f64,
    pub principal: f64,
    /// Actual debt service paid this year (interest + principal); 0 once the
    /// loan is repaid.
    pub annuity: f64,
    pub remaining_balance_end: f64,
}

impl AmortizationRow {
    /// A year with no outstanding debt.
    pub fn paid_off(year: u32) -> Self {
        Self {
            year,
            interest: 0.0,
            principal: 0.0,
            annuity: 0.0,
            remaining_balance_end: 0.0,
        }
    }
}

/// Complete yearly schedule for a loan.
///
/// The balance is non-increasing and reaches exactly 0 in the final year;
/// the principal column sums to the original loan amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub rows: Vec<AmortizationRow>,
    /// Years in which interest exceeded the annuity and the principal portion
    /// was clamped to 0 (inconsistent inputs, surfaced instead of hidden).
    pub clamped_years: Vec<u32>,
}

impl AmortizationSchedule {
    /// Outstanding balance after `year` full years (`year` = 0 gives the
    /// original principal back via the first row's opening balance).
    pub fn remaining_debt_after(&self, year: u32) -> f64 {
        if year == 0 {
            return self
                .rows
                .first()
                .map(|r| r.remaining_balance_end + r.principal)
                .unwrap_or(0.0);
        }
        self.rows
            .get(year as usize - 1)
            .map(|r| r.remaining_balance_end)
            .unwrap_or(0.0)
    }

    pub fn total_principal(&self) -> f64 {
        self.rows.iter().map(|r| r.principal).sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|r| r.interest).sum()
    }

    /// Per-year principal payments, in year order.
    pub fn principal_by_year(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.principal).collect()
    }

    /// Per-year interest payments, in year order.
    pub fn interest_by_year(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.interest).collect()
    }
}

/// Monthly annuity payment for a loan.
///
/// At a rate <= 0 the payment is plain principal over the number of months.
pub fn annuity(principal: f64, annual_rate_pct: f64, term_years: u32) -> f64 {
    if principal <= 0.0 || term_years == 0 {
        return 0.0;
    }
    let months = (term_years * 12) as f64;
    if annual_rate_pct <= 0.0 {
        return principal / months;
    }

    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    let growth = (1.0 + monthly_rate).powf(months);
    principal * (monthly_rate * growth) / (growth - 1.0)
}

/// Largest loan affordable at a given monthly payment.
///
/// Exact algebraic inverse of [`annuity`]: round-tripping a loan through both
/// reproduces it within a currency unit.
pub fn max_loan(max_annuity: f64, annual_rate_pct: f64, term_years: u32) -> f64 {
    if max_annuity <= 0.0 || term_years == 0 {
        return 0.0;
    }
    let months = (term_years * 12) as f64;
    if annual_rate_pct <= 0.0 {
        return max_annuity * months;
    }

    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    let growth = (1.0 + monthly_rate).powf(months);
    max_annuity * (growth - 1.0) / (monthly_rate * growth)
}

/// Build the yearly amortization schedule for a loan, paying the standard
/// annuity for its terms.
pub fn schedule(terms: &LoanTerms) -> Result<AmortizationSchedule, EngineError> {
    let yearly_annuity = annuity(terms.principal, terms.annual_rate_pct, terms.term_years) * 12.0;
    schedule_with_payment(terms, yearly_annuity)
}

/// Build the yearly schedule for a caller-chosen yearly payment (financing
/// forms commonly derive it from a repayment percentage instead of the term).
///
/// Interest accrues on the opening balance at the annual rate; the principal
/// portion is the payment minus interest, clamped at 0 when the payment does
/// not even cover interest (the year is recorded in `clamped_years`). The
/// final year absorbs the residual so the closing balance lands on exactly 0.
pub fn schedule_with_payment(
    terms: &LoanTerms,
    yearly_annuity: f64,
) -> Result<AmortizationSchedule, EngineError> {
    terms.validate()?;
    require_non_negative("yearly_annuity", yearly_annuity)?;

    let rate = terms.annual_rate_pct.max(0.0) / 100.0;

    let mut rows = Vec::with_capacity(terms.term_years as usize);
    let mut clamped_years = Vec::new();
    let mut balance = terms.principal;

    for year in 1..=terms.term_years {
        if balance <= 0.0 {
            rows.push(AmortizationRow::paid_off(year));
            continue;
        }

        let interest = balance * rate;
        let principal = if year == terms.term_years {
            // Final year: repay whatever is left so the schedule closes at 0.
            balance
        } else {
            if yearly_annuity < interest {
                clamped_years.push(year);
                log::warn!(
                    "year {year}: interest {interest:.2} exceeds annuity {yearly_annuity:.2}, principal clamped to 0"
                );
            }
            (yearly_annuity - interest).max(0.0).min(balance)
        };

        balance = (balance - principal).max(0.0);
        rows.push(AmortizationRow {
            year,
            interest,
            principal,
            annuity: interest + principal,
            remaining_balance_end: balance,
        });
    }

    Ok(AmortizationSchedule { rows, clamped_years })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_annuity_zero_rate() {
        // 300000 over 30 years at 0 %: 300000 / 360 = 833.33
        assert_abs_diff_eq!(annuity(300_000.0, 0.0, 30), 833.33, epsilon = 0.01);
    }

    #[test]
    fn test_annuity_standard_case() {
        // Reference figure for 300000 at 3.5 % over 30 years
        assert_abs_diff_eq!(annuity(300_000.0, 3.5, 30), 1347.13, epsilon = 0.01);
    }

    #[test]
    fn test_annuity_negative_rate_floored() {
        assert_abs_diff_eq!(annuity(300_000.0, -1.0, 30), annuity(300_000.0, 0.0, 30));
    }

    #[test]
    fn test_annuity_monotone_in_principal_and_rate() {
        assert!(annuity(400_000.0, 3.5, 30) > annuity(300_000.0, 3.5, 30));
        assert!(annuity(300_000.0, 5.0, 30) > annuity(300_000.0, 3.5, 30));
    }

    #[test]
    fn test_max_loan_round_trip() {
        for &rate in &[0.0, 1.0, 3.5, 10.0] {
            for &term in &[1u32, 10, 30] {
                let loan = 250_000.0;
                let payment = annuity(loan, rate, term);
                let recovered = max_loan(payment, rate, term);
                assert_abs_diff_eq!(recovered, loan, epsilon = 1.0);
            }
        }
    }

    #[test]
    fn test_max_loan_zero_rate() {
        assert_abs_diff_eq!(max_loan(1000.0, 0.0, 30), 360_000.0, epsilon = 0.01);
    }

    #[test]
    fn test_schedule_principal_sums_to_loan() {
        for &rate in &[0.0, 1.0, 3.5, 10.0] {
            let terms = LoanTerms::new(400_000.0, rate, 30);
            let schedule = schedule(&terms).unwrap();
            assert_abs_diff_eq!(schedule.total_principal(), 400_000.0, epsilon = 1.0);
            assert_eq!(schedule.rows.last().unwrap().remaining_balance_end, 0.0);
        }
    }

    #[test]
    fn test_schedule_balance_non_increasing() {
        let terms = LoanTerms::new(400_000.0, 3.5, 30);
        let schedule = schedule(&terms).unwrap();
        let mut prev = terms.principal;
        for row in &schedule.rows {
            assert!(row.remaining_balance_end <= prev + 1e-9);
            prev = row.remaining_balance_end;
        }
    }

    #[test]
    fn test_schedule_interest_matches_opening_balance() {
        let terms = LoanTerms::new(100_000.0, 4.0, 10);
        let sched = schedule(&terms).unwrap();
        assert_relative_eq!(sched.rows[0].interest, 4_000.0, max_relative = 1e-12);
        let opening_y2 = sched.rows[0].remaining_balance_end;
        assert_relative_eq!(sched.rows[1].interest, opening_y2 * 0.04, max_relative = 1e-12);
    }

    #[test]
    fn test_schedule_rejects_invalid_terms() {
        assert!(schedule(&LoanTerms::new(-1.0, 3.5, 30)).is_err());
        assert!(schedule(&LoanTerms::new(100_000.0, 3.5, 0)).is_err());
        assert!(schedule(&LoanTerms::new(f64::NAN, 3.5, 30)).is_err());
    }

    #[test]
    fn test_schedule_with_payment_clamps_negative_amortization() {
        // A payment below the interest level cannot amortize; the principal
        // portion stays at 0 and the shortfall years are reported.
        let terms = LoanTerms::new(100_000.0, 5.0, 3);
        let sched = schedule_with_payment(&terms, 1_000.0).unwrap();
        assert_eq!(sched.clamped_years, vec![1, 2]);
        assert_eq!(sched.rows[0].principal, 0.0);
        assert_eq!(sched.rows[1].principal, 0.0);
        // Final year still closes at 0 by absorbing the full balance.
        assert_eq!(sched.rows[2].remaining_balance_end, 0.0);
        assert_abs_diff_eq!(sched.total_principal(), 100_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_remaining_debt_helper() {
        let terms = LoanTerms::new(400_000.0, 3.5, 30);
        let sched = schedule(&terms).unwrap();
        assert_abs_diff_eq!(sched.remaining_debt_after(0), 400_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(
            sched.remaining_debt_after(1),
            400_000.0 - sched.rows[0].principal,
            epsilon = 1e-6
        );
        assert_eq!(sched.remaining_debt_after(30), 0.0);
        assert_eq!(sched.remaining_debt_after(99), 0.0);
    }
}

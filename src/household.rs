//! Household debt-service affordability check
//!
//! Nets haircut-adjusted income against fixed costs and per-head living
//! allowances, then stress-tests the requested loan's annuity against the
//! remaining surplus.

use serde::{Deserialize, Serialize};

use crate::amortization;
use crate::error::{require_finite, require_fraction, require_non_negative, EngineError};

/// Type of an employment income, deciding which haircut applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmploymentType {
    Employee,
    SelfEmployed,
    Pension,
}

/// A single employment income line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentIncome {
    pub label: String,
    pub net_monthly: f64,
    pub employment_type: EmploymentType,
}

/// A rental or other recurring income line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleIncome {
    pub label: String,
    pub net_monthly: f64,
}

/// An already-running loan the household services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingLoan {
    pub label: String,
    pub monthly_payment: f64,
    pub remaining_balance: f64,
}

/// Income discounts applied per income class, as fractions.
///
/// Salaried and pension income carry no haircut.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HaircutConfig {
    pub self_employed_pct: f64,
    pub rental_pct: f64,
    pub other_pct: f64,
}

impl HaircutConfig {
    fn for_employment(&self, employment_type: EmploymentType) -> f64 {
        match employment_type {
            EmploymentType::Employee | EmploymentType::Pension => 0.0,
            EmploymentType::SelfEmployed => self.self_employed_pct,
        }
    }
}

/// Everything the affordability check needs, all monthly figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdInputs {
    pub adults: u32,
    pub children: u32,
    pub employment_incomes: Vec<EmploymentIncome>,
    pub rental_incomes: Vec<SimpleIncome>,
    pub other_incomes: Vec<SimpleIncome>,
    pub rent_or_housing_cost: f64,
    pub utilities_energy: f64,
    pub telecom_internet: f64,
    pub insurance: f64,
    pub transport_leases: f64,
    pub alimony: f64,
    pub other_fixed_expenses: f64,
    pub existing_loans: Vec<ExistingLoan>,
    /// Flat living allowance per adult, banks' standard budget figure.
    pub pauschale_per_adult: f64,
    pub pauschale_per_child: f64,
    pub haircut: HaircutConfig,
    pub target_loan_amount: f64,
    pub nominal_interest_pct: f64,
    pub term_years: u32,
    /// Interest add-on (percentage points) for the stress test.
    pub stress_interest_add_pct: f64,
    pub min_monthly_buffer: f64,
}

impl HouseholdInputs {
    fn validate(&self) -> Result<(), EngineError> {
        for income in &self.employment_incomes {
            require_finite("employment_incomes.net_monthly", income.net_monthly)?;
        }
        for income in &self.rental_incomes {
            require_finite("rental_incomes.net_monthly", income.net_monthly)?;
        }
        for income in &self.other_incomes {
            require_finite("other_incomes.net_monthly", income.net_monthly)?;
        }
        for loan in &self.existing_loans {
            require_non_negative("existing_loans.monthly_payment", loan.monthly_payment)?;
        }
        require_non_negative("rent_or_housing_cost", self.rent_or_housing_cost)?;
        require_non_negative("utilities_energy", self.utilities_energy)?;
        require_non_negative("telecom_internet", self.telecom_internet)?;
        require_non_negative("insurance", self.insurance)?;
        require_non_negative("transport_leases", self.transport_leases)?;
        require_non_negative("alimony", self.alimony)?;
        require_non_negative("other_fixed_expenses", self.other_fixed_expenses)?;
        require_non_negative("pauschale_per_adult", self.pauschale_per_adult)?;
        require_non_negative("pauschale_per_child", self.pauschale_per_child)?;
        require_fraction("haircut.self_employed_pct", self.haircut.self_employed_pct)?;
        require_fraction("haircut.rental_pct", self.haircut.rental_pct)?;
        require_fraction("haircut.other_pct", self.haircut.other_pct)?;
        require_non_negative("target_loan_amount", self.target_loan_amount)?;
        require_finite("nominal_interest_pct", self.nominal_interest_pct)?;
        require_non_negative("stress_interest_add_pct", self.stress_interest_add_pct)?;
        require_non_negative("min_monthly_buffer", self.min_monthly_buffer)?;
        if self.term_years < 1 {
            return Err(EngineError::invalid("term_years", "must be >= 1"));
        }
        Ok(())
    }
}

/// Outcome of the affordability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdResult {
    pub adjusted_income: f64,
    pub fixed_costs: f64,
    /// May be negative; a household can run a structural deficit.
    pub surplus: f64,
    pub annuity: f64,
    pub annuity_stress: f64,
    /// Surplus over annuity, rounded to 2 decimals; 0 when no loan is
    /// requested.
    pub dscr: f64,
    /// Annuity as a percent of adjusted income (0 when income is 0).
    pub debt_service_share: f64,
    /// Fixed costs as a percent of adjusted income (0 when income is 0).
    pub fixed_cost_share: f64,
    pub buffer_after_nominal: f64,
    pub buffer_after_stress: f64,
    pub max_loan: f64,
    pub pass_nominal: bool,
    pub pass_stress: bool,
    pub overall_pass: bool,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run the affordability check.
///
/// With no loan requested (annuity of 0) there is no debt burden to fail:
/// both pass flags default to true and the DSCR is defined as 0.
pub fn evaluate(inputs: &HouseholdInputs) -> Result<HouseholdResult, EngineError> {
    inputs.validate()?;

    let employment: f64 = inputs
        .employment_incomes
        .iter()
        .map(|i| i.net_monthly * (1.0 - inputs.haircut.for_employment(i.employment_type)))
        .sum();
    let rental: f64 = inputs
        .rental_incomes
        .iter()
        .map(|i| i.net_monthly * (1.0 - inputs.haircut.rental_pct))
        .sum();
    let other: f64 = inputs
        .other_incomes
        .iter()
        .map(|i| i.net_monthly * (1.0 - inputs.haircut.other_pct))
        .sum();
    let adjusted_income = employment + rental + other;

    let existing_debt_service: f64 = inputs.existing_loans.iter().map(|l| l.monthly_payment).sum();
    let fixed_costs = inputs.rent_or_housing_cost
        + inputs.utilities_energy
        + inputs.telecom_internet
        + inputs.insurance
        + inputs.transport_leases
        + inputs.alimony
        + inputs.other_fixed_expenses
        + existing_debt_service
        + inputs.adults as f64 * inputs.pauschale_per_adult
        + inputs.children as f64 * inputs.pauschale_per_child;

    let surplus = adjusted_income - fixed_costs;

    let annuity = amortization::annuity(
        inputs.target_loan_amount,
        inputs.nominal_interest_pct,
        inputs.term_years,
    );
    let annuity_stress = amortization::annuity(
        inputs.target_loan_amount,
        inputs.nominal_interest_pct + inputs.stress_interest_add_pct,
        inputs.term_years,
    );

    let buffer_after_nominal = surplus - annuity;
    let buffer_after_stress = surplus - annuity_stress;

    let (pass_nominal, pass_stress) = if annuity > 0.0 {
        (
            buffer_after_nominal >= inputs.min_monthly_buffer,
            buffer_after_stress >= 0.0,
        )
    } else {
        (true, true)
    };

    let dscr = if annuity > 0.0 { surplus / annuity } else { 0.0 };
    let debt_service_share = if adjusted_income > 0.0 {
        annuity / adjusted_income * 100.0
    } else {
        0.0
    };
    let fixed_cost_share = if adjusted_income > 0.0 {
        fixed_costs / adjusted_income * 100.0
    } else {
        0.0
    };

    let max_loan = amortization::max_loan(
        (surplus - inputs.min_monthly_buffer).max(0.0),
        inputs.nominal_interest_pct,
        inputs.term_years,
    );

    Ok(HouseholdResult {
        adjusted_income,
        fixed_costs,
        surplus,
        annuity,
        annuity_stress,
        dscr: round2(dscr),
        debt_service_share: round2(debt_service_share),
        fixed_cost_share: round2(fixed_cost_share),
        buffer_after_nominal,
        buffer_after_stress,
        max_loan,
        pass_nominal,
        pass_stress,
        overall_pass: pass_nominal && pass_stress,
    })
}

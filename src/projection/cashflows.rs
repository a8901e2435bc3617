//! Cashflow output structures for yearly projections

use serde::{Deserialize, Serialize};

/// Rent assumptions for the projection.
///
/// `growth_pct` and `vacancy_pct` are fractions (0.02 = 2 %); vacancy must be
/// within [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RentAssumptions {
    /// Gross rent collected in year 1.
    pub base_rent_year1: f64,
    pub growth_pct: f64,
    pub vacancy_pct: f64,
}

/// Non-recoverable operating cost assumptions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OperatingCostAssumptions {
    pub base_cost_year1: f64,
    pub growth_pct: f64,
}

/// Tax depreciation configuration (building AfA plus inventory write-off).
///
/// The accelerated first- and second-year rates are capped at 4.5 % and
/// 3.0 % of building value; higher configured rates are clipped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DepreciationConfig {
    pub building_value: f64,
    pub flat_rate_pct: f64,
    pub accelerated_enabled: bool,
    pub accelerated_year1_pct: f64,
    pub accelerated_year2_pct: f64,
    pub inventory_amount: f64,
    pub inventory_years: u32,
}

impl DepreciationConfig {
    /// No depreciation at all (e.g. land-only cases).
    pub fn none() -> Self {
        Self {
            building_value: 0.0,
            flat_rate_pct: 0.0,
            accelerated_enabled: false,
            accelerated_year1_pct: 0.0,
            accelerated_year2_pct: 0.0,
            inventory_amount: 0.0,
            inventory_years: 0,
        }
    }
}

/// One projected year of the investment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CashflowYear {
    pub year: u32,
    pub gross_income: f64,
    pub income_after_vacancy: f64,
    pub operating_expenses: f64,
    pub interest: f64,
    pub principal: f64,
    pub annuity: f64,
    /// Cash left after rent collection, operating costs, and debt service,
    /// before tax.
    pub free_cash_flow: f64,
    pub depreciation: f64,
    pub taxable_base: f64,
    pub tax: f64,
    pub free_cash_flow_after_tax: f64,
}

/// Complete multi-year projection result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowProjection {
    pub years: Vec<CashflowYear>,
}

impl CashflowProjection {
    /// Sum of pre-tax free cash flow over years 1..=through_year.
    pub fn cumulative_free_cash_flow(&self, through_year: u32) -> f64 {
        self.years
            .iter()
            .take(through_year as usize)
            .map(|y| y.free_cash_flow)
            .sum()
    }

    /// First year with a positive pre-tax free cash flow, if any.
    pub fn first_positive_year(&self) -> Option<u32> {
        self.years
            .iter()
            .find(|y| y.free_cash_flow > 0.0)
            .map(|y| y.year)
    }

    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            years: self.years.len() as u32,
            total_gross_income: self.years.iter().map(|y| y.gross_income).sum(),
            total_operating_expenses: self.years.iter().map(|y| y.operating_expenses).sum(),
            total_debt_service: self.years.iter().map(|y| y.annuity).sum(),
            total_tax: self.years.iter().map(|y| y.tax).sum(),
            total_depreciation: self.years.iter().map(|y| y.depreciation).sum(),
            total_free_cash_flow: self.years.iter().map(|y| y.free_cash_flow).sum(),
            total_free_cash_flow_after_tax: self
                .years
                .iter()
                .map(|y| y.free_cash_flow_after_tax)
                .sum(),
        }
    }
}

/// Totals across a projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub years: u32,
    pub total_gross_income: f64,
    pub total_operating_expenses: f64,
    pub total_debt_service: f64,
    pub total_tax: f64,
    pub total_depreciation: f64,
    pub total_free_cash_flow: f64,
    pub total_free_cash_flow_after_tax: f64,
}

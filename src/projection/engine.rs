//! Core projection engine for yearly investment cashflows

use crate::amortization::{AmortizationRow, AmortizationSchedule};
use crate::error::{require_fraction, require_non_negative, EngineError};
use super::cashflows::{
    CashflowProjection, CashflowYear, DepreciationConfig, OperatingCostAssumptions,
    RentAssumptions,
};

/// Legal cap on the accelerated first-year building depreciation rate.
const ACCELERATED_YEAR1_CAP: f64 = 0.045;
/// Legal cap on the accelerated second-year building depreciation rate.
const ACCELERATED_YEAR2_CAP: f64 = 0.030;

/// Projects yearly rent, operating costs, debt service, tax, and free cash
/// flow for an investment.
///
/// The projector is stateless between calls; every projection is derived
/// from the assumptions it was constructed with plus the amortization rows
/// passed in.
#[derive(Debug, Clone)]
pub struct CashflowProjector {
    rent: RentAssumptions,
    operating: OperatingCostAssumptions,
    depreciation: DepreciationConfig,
    /// Income tax rate applied to the yearly taxable base, as a fraction.
    tax_rate: f64,
}

impl CashflowProjector {
    pub fn new(
        rent: RentAssumptions,
        operating: OperatingCostAssumptions,
        depreciation: DepreciationConfig,
        tax_rate: f64,
    ) -> Result<Self, EngineError> {
        require_non_negative("base_rent_year1", rent.base_rent_year1)?;
        require_fraction("vacancy_pct", rent.vacancy_pct)?;
        require_non_negative("base_cost_year1", operating.base_cost_year1)?;
        require_non_negative("building_value", depreciation.building_value)?;
        require_non_negative("flat_rate_pct", depreciation.flat_rate_pct)?;
        require_non_negative("inventory_amount", depreciation.inventory_amount)?;
        require_fraction("tax_rate", tax_rate)?;

        Ok(Self {
            rent,
            operating,
            depreciation,
            tax_rate,
        })
    }

    /// Project a single year against the matching amortization row.
    ///
    /// The taxable base adds the principal portion back to the free cash
    /// flow (repayment is not deductible but was already subtracted from
    /// FCF) and removes depreciation; a negative base yields zero tax.
    pub fn project_year(&self, year: u32, debt: &AmortizationRow) -> CashflowYear {
        let growth = (1.0 + self.rent.growth_pct).powi(year as i32 - 1);
        let gross_income = self.rent.base_rent_year1 * growth;
        let income_after_vacancy = gross_income * (1.0 - self.rent.vacancy_pct);

        let operating_expenses =
            self.operating.base_cost_year1 * (1.0 + self.operating.growth_pct).powi(year as i32 - 1);

        let free_cash_flow = income_after_vacancy - operating_expenses - debt.annuity;

        let depreciation = self.depreciation_for_year(year);
        let taxable_base = (free_cash_flow + debt.principal) - depreciation;
        let tax = (taxable_base * self.tax_rate).max(0.0);

        CashflowYear {
            year,
            gross_income,
            income_after_vacancy,
            operating_expenses,
            interest: debt.interest,
            principal: debt.principal,
            annuity: debt.annuity,
            free_cash_flow,
            depreciation,
            taxable_base,
            tax,
            free_cash_flow_after_tax: free_cash_flow - tax,
        }
    }

    /// Project years 1..=horizon. Years past the end of the schedule carry
    /// no debt service.
    pub fn project(&self, schedule: &AmortizationSchedule, horizon: u32) -> CashflowProjection {
        let years = (1..=horizon)
            .map(|year| {
                let debt = schedule
                    .rows
                    .get(year as usize - 1)
                    .copied()
                    .unwrap_or_else(|| AmortizationRow::paid_off(year));
                self.project_year(year, &debt)
            })
            .collect();

        CashflowProjection { years }
    }

    /// Building depreciation (flat or accelerated with caps) plus the
    /// straight-line inventory write-off while it lasts.
    fn depreciation_for_year(&self, year: u32) -> f64 {
        let d = &self.depreciation;

        let building_rate = if d.accelerated_enabled && year == 1 {
            d.accelerated_year1_pct.min(ACCELERATED_YEAR1_CAP)
        } else if d.accelerated_enabled && year == 2 {
            d.accelerated_year2_pct.min(ACCELERATED_YEAR2_CAP)
        } else {
            d.flat_rate_pct
        };
        let building = d.building_value * building_rate;

        let inventory = if d.inventory_years > 0 && year <= d.inventory_years {
            d.inventory_amount / d.inventory_years as f64
        } else {
            0.0
        };

        building + inventory
    }
}

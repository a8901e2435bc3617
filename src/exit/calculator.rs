//! Exit scenario evaluation: sale proceeds, cumulative return, IRR/ROI/NPV

use serde::{Deserialize, Serialize};

use crate::error::{require_fraction, require_non_negative, EngineError};
use crate::projection::CashflowProjection;
use crate::valuation::PropertyValueYear;
use super::irr;

/// Discount rate used for the reported NPV figure.
const NPV_DISCOUNT_RATE: f64 = 0.05;
/// IRR below this (in percent) is flagged as an unattractive return.
const LOW_IRR_THRESHOLD_PCT: f64 = 5.0;

/// How the sale price is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    /// A single flat sale price.
    Flat,
    /// Price per square meter times living area.
    PerSqm,
}

/// One-off costs incurred to ready and close the sale.
///
/// All four items are deductible exit costs and are summed in full —
/// including notary and transfer tax.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PreSaleCosts {
    pub renovation: f64,
    pub notary: f64,
    pub transfer_tax: f64,
    pub other: f64,
}

impl PreSaleCosts {
    pub fn total(&self) -> f64 {
        self.renovation + self.notary + self.transfer_tax + self.other
    }
}

/// Inputs for evaluating a property sale at a chosen future year.
///
/// The per-year arrays describe the holding period (index 0 = year 1) and
/// must cover at least `exit_year` entries; they are typically filled from an
/// amortization schedule and cashflow projection via [`attach_projection`].
///
/// [`attach_projection`]: ExitScenarioInputs::attach_projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitScenarioInputs {
    pub purchase_price: f64,
    pub closing_costs: f64,
    pub initial_loan: f64,
    pub initial_equity: f64,
    pub living_area: f64,
    pub exit_year: u32,
    /// Pure-sale mode: running cashflows are ignored entirely; only the
    /// initial equity outlay and the net exit proceeds enter the metrics.
    pub pure_sale: bool,
    pub sale_type: SaleType,
    pub sale_price_flat: Option<f64>,
    pub sale_price_per_sqm: Option<f64>,
    /// Broker commission on the resolved sale price, as a fraction.
    pub broker_fee_pct: f64,
    pub pre_sale_costs: PreSaleCosts,
    /// Income tax rate the cashflow arrays were produced under; recorded in
    /// the snapshot for reproducibility.
    pub tax_rate_pct: f64,
    pub rent_by_year: Vec<f64>,
    pub operating_costs_by_year: Vec<f64>,
    pub principal_by_year: Vec<f64>,
    pub interest_by_year: Vec<f64>,
    /// End-of-year market values; used as the sale-price fallback when no
    /// explicit price is supplied.
    pub property_value_by_year: Vec<f64>,
}

impl ExitScenarioInputs {
    /// Fill the per-year arrays from a projection and value curve.
    ///
    /// Tax is folded into the operating-cost column so the derived yearly
    /// cashflows line up with the projection's after-tax free cash flow.
    /// `values` is expected to start at year 0 (the purchase price).
    pub fn attach_projection(&mut self, projection: &CashflowProjection, values: &[PropertyValueYear]) {
        self.rent_by_year = projection.years.iter().map(|y| y.income_after_vacancy).collect();
        self.operating_costs_by_year = projection
            .years
            .iter()
            .map(|y| y.operating_expenses + y.tax)
            .collect();
        self.principal_by_year = projection.years.iter().map(|y| y.principal).collect();
        self.interest_by_year = projection.years.iter().map(|y| y.interest).collect();
        self.property_value_by_year = values.iter().skip(1).map(|v| v.value).collect();
    }

    fn validate(&self) -> Result<(), EngineError> {
        require_non_negative("purchase_price", self.purchase_price)?;
        require_non_negative("closing_costs", self.closing_costs)?;
        require_non_negative("initial_loan", self.initial_loan)?;
        require_non_negative("initial_equity", self.initial_equity)?;
        require_non_negative("living_area", self.living_area)?;
        require_fraction("broker_fee_pct", self.broker_fee_pct)?;
        require_fraction("tax_rate_pct", self.tax_rate_pct)?;
        require_non_negative("pre_sale_costs", self.pre_sale_costs.total())?;

        if self.exit_year < 1 {
            return Err(EngineError::invalid("exit_year", "must be >= 1"));
        }
        let horizon = self.exit_year as usize;
        for (field, len) in [
            ("rent_by_year", self.rent_by_year.len()),
            ("operating_costs_by_year", self.operating_costs_by_year.len()),
            ("principal_by_year", self.principal_by_year.len()),
            ("interest_by_year", self.interest_by_year.len()),
        ] {
            if len < horizon {
                return Err(EngineError::invalid(
                    field,
                    format!("covers {len} years but exit_year is {horizon}"),
                ));
            }
        }
        Ok(())
    }

    /// Resolve the sale price: the explicit flat or per-sqm figure per
    /// `sale_type`, falling back to the year's market value when none is
    /// supplied.
    fn resolve_sale_price(&self) -> Result<f64, EngineError> {
        let explicit = match self.sale_type {
            SaleType::Flat => self.sale_price_flat,
            SaleType::PerSqm => self.sale_price_per_sqm.map(|p| p * self.living_area),
        };
        if let Some(price) = explicit {
            return require_non_negative("sale_price", price);
        }

        match self.property_value_by_year.get(self.exit_year as usize - 1) {
            Some(&value) => {
                log::info!(
                    "no sale price supplied, falling back to year-{} market value {value:.2}",
                    self.exit_year
                );
                Ok(value)
            }
            None => Err(EngineError::invalid(
                "property_value_by_year",
                format!(
                    "no sale price supplied and no market value for year {}",
                    self.exit_year
                ),
            )),
        }
    }
}

/// Result of an exit scenario evaluation.
///
/// `total_proceeds` always decomposes exactly as
/// `(resolved_sale_price - remaining_debt) - exit_costs
///  + cumulative_free_cash_flow`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitScenarioResult {
    pub exit_year: u32,
    pub resolved_sale_price: f64,
    pub remaining_debt: f64,
    pub exit_costs: f64,
    /// Sale price minus remaining debt, before exit costs.
    pub sale_proceeds_net: f64,
    /// Sum of holding-period free cash flows (year-0 equity excluded).
    pub cumulative_free_cash_flow: f64,
    pub net_exit_proceeds: f64,
    pub total_proceeds: f64,
    pub roi_pct: f64,
    /// None when the cashflow series has no internal rate of return.
    pub irr_pct: Option<f64>,
    /// NPV of the full series at a 5 % discount rate.
    pub npv: f64,
    /// First year the cumulative series turns non-negative, if any.
    pub payback_year: Option<u32>,
    /// Full cashflow series, index = year (0 = equity outlay, final year
    /// includes the net exit proceeds).
    pub yearly_cashflows: Vec<f64>,
    pub cumulative_cashflows: Vec<f64>,
}

/// Classification of an exit scenario warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Risk,
    Liquidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Low,
    Medium,
    High,
}

/// A non-fatal finding about an evaluated scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitWarning {
    pub kind: WarningKind,
    pub severity: WarningSeverity,
    pub message: String,
}

/// Evaluate an exit scenario.
///
/// Pure: same inputs, same result. In pure-sale mode all intermediate yearly
/// cashflows are forced to 0 inside the engine, so rent and operating-cost
/// inputs provably cannot move the metrics.
pub fn evaluate(inputs: &ExitScenarioInputs) -> Result<ExitScenarioResult, EngineError> {
    inputs.validate()?;

    let horizon = inputs.exit_year as usize;

    // Holding-period free cash flow per year: rent less operating costs and
    // debt service. Zeroed entirely in pure-sale mode.
    let free_cash_flows: Vec<f64> = if inputs.pure_sale {
        vec![0.0; horizon]
    } else {
        (0..horizon)
            .map(|i| {
                inputs.rent_by_year[i]
                    - inputs.operating_costs_by_year[i]
                    - inputs.interest_by_year[i]
                    - inputs.principal_by_year[i]
            })
            .collect()
    };

    let resolved_sale_price = inputs.resolve_sale_price()?;

    let principal_repaid: f64 = inputs.principal_by_year[..horizon].iter().sum();
    let remaining_debt = (inputs.initial_loan - principal_repaid).max(0.0);

    let exit_costs = resolved_sale_price * inputs.broker_fee_pct + inputs.pre_sale_costs.total();
    let sale_proceeds_net = resolved_sale_price - remaining_debt;
    let cumulative_free_cash_flow: f64 = free_cash_flows.iter().sum();
    let net_exit_proceeds = sale_proceeds_net - exit_costs;
    let total_proceeds = net_exit_proceeds + cumulative_free_cash_flow;

    // ROI on the equity actually put in; defined as 0 for an all-debt deal.
    let roi_pct = if inputs.initial_equity > 0.0 {
        (total_proceeds - inputs.initial_equity) / inputs.initial_equity * 100.0
    } else {
        0.0
    };

    // Cashflow series for IRR/NPV: equity out in year 0, exit proceeds on top
    // of the final holding year.
    let mut yearly_cashflows = Vec::with_capacity(horizon + 1);
    yearly_cashflows.push(-inputs.initial_equity);
    yearly_cashflows.extend_from_slice(&free_cash_flows);
    if let Some(last) = yearly_cashflows.last_mut() {
        *last += net_exit_proceeds;
    }

    let irr_pct = irr::annual_irr(&yearly_cashflows).map(|r| r * 100.0);
    let npv = irr::npv(&yearly_cashflows, NPV_DISCOUNT_RATE);

    let cumulative_cashflows: Vec<f64> = yearly_cashflows
        .iter()
        .scan(0.0, |acc, &cf| {
            *acc += cf;
            Some(*acc)
        })
        .collect();
    let payback_year = cumulative_cashflows
        .iter()
        .position(|&c| c >= 0.0)
        .map(|i| i as u32);

    Ok(ExitScenarioResult {
        exit_year: inputs.exit_year,
        resolved_sale_price,
        remaining_debt,
        exit_costs,
        sale_proceeds_net,
        cumulative_free_cash_flow,
        net_exit_proceeds,
        total_proceeds,
        roi_pct,
        irr_pct,
        npv,
        payback_year,
        yearly_cashflows,
        cumulative_cashflows,
    })
}

/// Inspect an evaluated scenario for findings worth surfacing to the user.
pub fn warnings(result: &ExitScenarioResult) -> Vec<ExitWarning> {
    let mut warnings = Vec::new();

    match result.irr_pct {
        Some(irr) if irr < LOW_IRR_THRESHOLD_PCT => warnings.push(ExitWarning {
            kind: WarningKind::Risk,
            severity: WarningSeverity::High,
            message: format!("IRR of {irr:.1} % is below the {LOW_IRR_THRESHOLD_PCT:.0} % attractiveness threshold"),
        }),
        None => warnings.push(ExitWarning {
            kind: WarningKind::Risk,
            severity: WarningSeverity::Medium,
            message: "no internal rate of return exists for this cashflow series".to_string(),
        }),
        _ => {}
    }

    let negative_years: Vec<u32> = result.yearly_cashflows[1..]
        .iter()
        .enumerate()
        .filter(|(_, &cf)| cf < 0.0)
        .map(|(i, _)| i as u32 + 1)
        .collect();
    if !negative_years.is_empty() {
        warnings.push(ExitWarning {
            kind: WarningKind::Liquidity,
            severity: WarningSeverity::Medium,
            message: format!(
                "negative cashflow in {} of {} holding years; liquidity reserves needed",
                negative_years.len(),
                result.exit_year
            ),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Ten-year hold of the reference case: 500k purchase, 400k loan,
    /// 125k equity, flat sale at 650k with a 5 % broker fee.
    fn reference_inputs() -> ExitScenarioInputs {
        ExitScenarioInputs {
            purchase_price: 500_000.0,
            closing_costs: 25_000.0,
            initial_loan: 400_000.0,
            initial_equity: 125_000.0,
            living_area: 160.0,
            exit_year: 10,
            pure_sale: false,
            sale_type: SaleType::Flat,
            sale_price_flat: Some(650_000.0),
            sale_price_per_sqm: None,
            broker_fee_pct: 0.05,
            pre_sale_costs: PreSaleCosts::default(),
            tax_rate_pct: 0.0,
            rent_by_year: vec![30_000.0; 10],
            operating_costs_by_year: vec![8_000.0; 10],
            principal_by_year: vec![9_000.0; 10],
            interest_by_year: vec![13_000.0; 10],
            property_value_by_year: (1..=10).map(|y| 500_000.0 * 1.03f64.powi(y)).collect(),
        }
    }

    #[test]
    fn test_reference_case_decomposition() {
        let inputs = reference_inputs();
        let result = evaluate(&inputs).unwrap();

        assert_abs_diff_eq!(result.exit_costs, 32_500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.remaining_debt, 400_000.0 - 90_000.0, epsilon = 1e-9);

        // Total proceeds must reproduce the reported decomposition exactly.
        let expected = (650_000.0 - result.remaining_debt) - 32_500.0
            + result.cumulative_free_cash_flow;
        assert_abs_diff_eq!(result.total_proceeds, expected, epsilon = 1.0);

        // Per-year FCF: 30000 - 8000 - 13000 - 9000 = 0 each year.
        assert_abs_diff_eq!(result.cumulative_free_cash_flow, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            result.roi_pct,
            (result.total_proceeds - 125_000.0) / 125_000.0 * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_series_shape() {
        let result = evaluate(&reference_inputs()).unwrap();
        assert_eq!(result.yearly_cashflows.len(), 11);
        assert_abs_diff_eq!(result.yearly_cashflows[0], -125_000.0);
        assert_abs_diff_eq!(
            result.yearly_cashflows[10],
            result.net_exit_proceeds,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            *result.cumulative_cashflows.last().unwrap(),
            result.yearly_cashflows.iter().sum::<f64>(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_pure_sale_ignores_running_cashflows() {
        let mut inputs = reference_inputs();
        inputs.pure_sale = true;
        let baseline = evaluate(&inputs).unwrap();

        // Wildly different rent and operating costs must not move anything.
        inputs.rent_by_year = vec![99_999.0; 10];
        inputs.operating_costs_by_year = vec![1.0; 10];
        let perturbed = evaluate(&inputs).unwrap();

        assert_eq!(baseline.irr_pct, perturbed.irr_pct);
        assert_abs_diff_eq!(baseline.roi_pct, perturbed.roi_pct, epsilon = 1e-12);
        assert_abs_diff_eq!(baseline.total_proceeds, perturbed.total_proceeds, epsilon = 1e-9);
        assert_abs_diff_eq!(baseline.cumulative_free_cash_flow, 0.0);
    }

    #[test]
    fn test_per_sqm_price_resolution() {
        let mut inputs = reference_inputs();
        inputs.sale_type = SaleType::PerSqm;
        inputs.sale_price_flat = None;
        inputs.sale_price_per_sqm = Some(4_000.0);
        let result = evaluate(&inputs).unwrap();
        assert_abs_diff_eq!(result.resolved_sale_price, 640_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_market_value_fallback() {
        let mut inputs = reference_inputs();
        inputs.sale_price_flat = None;
        let result = evaluate(&inputs).unwrap();
        assert_abs_diff_eq!(
            result.resolved_sale_price,
            500_000.0 * 1.03f64.powi(10),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_fallback_without_market_values_is_an_error() {
        let mut inputs = reference_inputs();
        inputs.sale_price_flat = None;
        inputs.property_value_by_year.clear();
        let err = evaluate(&inputs).unwrap_err();
        assert!(err.to_string().contains("property_value_by_year"));
    }

    #[test]
    fn test_pre_sale_costs_all_itemized() {
        let mut inputs = reference_inputs();
        inputs.pre_sale_costs = PreSaleCosts {
            renovation: 10_000.0,
            notary: 2_000.0,
            transfer_tax: 3_500.0,
            other: 500.0,
        };
        let result = evaluate(&inputs).unwrap();
        assert_abs_diff_eq!(result.exit_costs, 32_500.0 + 16_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_short_arrays_rejected() {
        let mut inputs = reference_inputs();
        inputs.principal_by_year.truncate(5);
        let err = evaluate(&inputs).unwrap_err();
        assert!(err.to_string().contains("principal_by_year"));
    }

    #[test]
    fn test_zero_equity_roi_is_neutral() {
        let mut inputs = reference_inputs();
        inputs.initial_equity = 0.0;
        let result = evaluate(&inputs).unwrap();
        assert_eq!(result.roi_pct, 0.0);
    }

    #[test]
    fn test_remaining_debt_clamped_at_zero() {
        let mut inputs = reference_inputs();
        inputs.principal_by_year = vec![50_000.0; 10]; // repays more than the loan
        let result = evaluate(&inputs).unwrap();
        assert_eq!(result.remaining_debt, 0.0);
    }

    #[test]
    fn test_irr_sentinel_for_total_loss() {
        let mut inputs = reference_inputs();
        // Sale price of 0 with huge remaining debt and no cashflows: series
        // is all outflows, no IRR exists.
        inputs.pure_sale = true;
        inputs.sale_price_flat = Some(0.0);
        let result = evaluate(&inputs).unwrap();
        assert_eq!(result.irr_pct, None);
    }

    #[test]
    fn test_warnings_flag_low_irr_and_negative_years() {
        let mut inputs = reference_inputs();
        inputs.rent_by_year = vec![25_000.0; 10]; // FCF -5000/year
        inputs.sale_price_flat = Some(460_000.0); // barely above debt + costs
        let result = evaluate(&inputs).unwrap();
        let findings = warnings(&result);

        assert!(findings
            .iter()
            .any(|w| w.kind == WarningKind::Liquidity && w.severity == WarningSeverity::Medium));
        assert!(findings.iter().any(|w| w.kind == WarningKind::Risk));
    }

    #[test]
    fn test_payback_year() {
        let mut inputs = reference_inputs();
        inputs.rent_by_year = vec![45_000.0; 10]; // FCF 15000/year
        let result = evaluate(&inputs).unwrap();
        // 125000 equity back after ceil(125000/15000) = 9 years.
        assert_eq!(result.payback_year, Some(9));
    }
}

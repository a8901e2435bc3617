//! Property value growth curve

use serde::{Deserialize, Serialize};

use crate::error::{require_finite, require_non_negative, EngineError};

/// Market environment applied on top of the base growth assumption.
///
/// Bear markets compress the growth rate to 60 %, bull markets stretch it to
/// 120 % of the base assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketScenario {
    Bear,
    Base,
    Bull,
}

impl Default for MarketScenario {
    fn default() -> Self {
        MarketScenario::Base
    }
}

impl MarketScenario {
    /// Growth-rate multiplier for this market environment.
    pub fn growth_multiplier(&self) -> f64 {
        match self {
            MarketScenario::Bear => 0.6,
            MarketScenario::Base => 1.0,
            MarketScenario::Bull => 1.2,
        }
    }

    /// Effective growth rate under this scenario.
    pub fn adjust(&self, growth_rate: f64) -> f64 {
        growth_rate * self.growth_multiplier()
    }
}

/// Property value at the end of one projection year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PropertyValueYear {
    pub year: u32,
    pub value: f64,
}

/// Compound value after `year` years: `P * (1 + g)^year`.
///
/// `value_at_year(P, g, 0) = P` and `value_at_year(P, 0, n) = P` for all n.
pub fn value_at_year(purchase_price: f64, growth_rate: f64, year: u32) -> f64 {
    purchase_price * (1.0 + growth_rate).powi(year as i32)
}

/// Value curve for years 0..=horizon under a market scenario.
pub fn value_series(
    purchase_price: f64,
    growth_rate: f64,
    scenario: MarketScenario,
    horizon: u32,
) -> Result<Vec<PropertyValueYear>, EngineError> {
    require_non_negative("purchase_price", purchase_price)?;
    require_finite("growth_rate", growth_rate)?;

    let effective = scenario.adjust(growth_rate);
    Ok((0..=horizon)
        .map(|year| PropertyValueYear {
            year,
            value: value_at_year(purchase_price, effective, year),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_year_zero_is_purchase_price() {
        assert_abs_diff_eq!(value_at_year(500_000.0, 0.03, 0), 500_000.0);
        assert_abs_diff_eq!(value_at_year(123_456.0, 0.10, 0), 123_456.0);
    }

    #[test]
    fn test_zero_growth_is_flat() {
        for year in [1, 10, 50] {
            assert_abs_diff_eq!(value_at_year(500_000.0, 0.0, year), 500_000.0);
        }
    }

    #[test]
    fn test_compounding() {
        assert_relative_eq!(
            value_at_year(500_000.0, 0.03, 10),
            500_000.0 * 1.03f64.powi(10),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_monotone_in_growth() {
        let low = value_at_year(500_000.0, 0.02, 10);
        let high = value_at_year(500_000.0, 0.03, 10);
        assert!(high > low);
    }

    #[test]
    fn test_market_scenario_multipliers() {
        let base = value_series(500_000.0, 0.03, MarketScenario::Base, 10).unwrap();
        let bear = value_series(500_000.0, 0.03, MarketScenario::Bear, 10).unwrap();
        let bull = value_series(500_000.0, 0.03, MarketScenario::Bull, 10).unwrap();

        assert_relative_eq!(
            bear[10].value,
            value_at_year(500_000.0, 0.018, 10),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            bull[10].value,
            value_at_year(500_000.0, 0.036, 10),
            max_relative = 1e-12
        );
        assert!(bear[10].value < base[10].value);
        assert!(bull[10].value > base[10].value);
        // Year 0 is the purchase price in every market.
        assert_abs_diff_eq!(bear[0].value, 500_000.0);
        assert_abs_diff_eq!(bull[0].value, 500_000.0);
    }

    #[test]
    fn test_series_rejects_invalid_inputs() {
        assert!(value_series(-1.0, 0.03, MarketScenario::Base, 10).is_err());
        assert!(value_series(500_000.0, f64::NAN, MarketScenario::Base, 10).is_err());
    }
}

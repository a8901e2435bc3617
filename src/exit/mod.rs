//! Exit scenario evaluation: sale at a chosen year and its return metrics

mod calculator;
mod irr;

pub use calculator::{
    evaluate, warnings, ExitScenarioInputs, ExitScenarioResult, ExitWarning, PreSaleCosts,
    SaleType, WarningKind, WarningSeverity,
};
pub use irr::{annual_irr, npv};

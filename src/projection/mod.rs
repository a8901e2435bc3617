//! Yearly investment cashflow projection with tax and depreciation

mod cashflows;
mod engine;

pub use cashflows::{
    CashflowProjection, CashflowYear, DepreciationConfig, OperatingCostAssumptions,
    ProjectionSummary, RentAssumptions,
};
pub use engine::CashflowProjector;

//! Immo Engine - financial projection and scenario engine for residential real-estate investments
//!
//! This library provides:
//! - Annuity loan math and yearly amortization schedules
//! - Multi-year cashflow projection with tax and depreciation
//! - Property value growth curves under market scenarios
//! - Exit-scenario return metrics (IRR/ROI/NPV) with pure-sale mode
//! - Household debt-service affordability stress testing
//! - Batch evaluation of independent scenario records
//!
//! Every calculation is a pure function over plain input structs; results
//! are plain structs the caller renders, exports, or persists as JSON.

pub mod amortization;
pub mod error;
pub mod exit;
pub mod household;
pub mod projection;
pub mod scenario;
pub mod valuation;

// Re-export commonly used types
pub use amortization::{AmortizationRow, AmortizationSchedule, LoanTerms};
pub use error::EngineError;
pub use exit::{ExitScenarioInputs, ExitScenarioResult};
pub use household::{HouseholdInputs, HouseholdResult};
pub use projection::{CashflowProjection, CashflowProjector, CashflowYear};
pub use scenario::{ScenarioRecord, ScenarioSet, ScenarioStatus};
pub use valuation::MarketScenario;

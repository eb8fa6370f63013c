//! Investment projection - gross and net value of a contribution plan
//!
//! This library provides:
//! - pt-BR numeric parsing for currency, percentage and period inputs
//! - Fixed-rate projections (closed form)
//! - Inflation- and benchmark-indexed projections (monthly simulation on forecast tables)
//! - Flat withholding on realized gain
//! - Batch runs and CSV reporting

pub mod error;
pub mod locale;
pub mod plan;
pub mod rates;
pub mod tax;
pub mod projection;
pub mod scenario;
pub mod report;

// Re-export commonly used types
pub use error::{ProjectionError, ValidationError, ValidationErrors};
pub use plan::{CalculationRequest, ContributionPlan, Duration, RateSpec, RawInput, Regime, TaxPolicy};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
pub use rates::{FocusClient, Indicator, RateTable, RateTableProvider, StaticRateProvider};
pub use scenario::ScenarioRunner;

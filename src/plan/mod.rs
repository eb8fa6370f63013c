//! Calculation inputs: validated entities, raw form input and batch loading

mod data;
mod input;
pub mod loader;

pub use data::{ContributionPlan, Duration, PeriodUnit, RatePeriodUnit, RateSpec, Regime, TaxPolicy};
pub use input::{CalculationRequest, RawInput};
pub use loader::{load_requests, load_requests_from_reader, BatchRequest};

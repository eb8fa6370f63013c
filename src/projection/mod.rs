//! Projection engine for fixed and indexed contribution plans

mod state;
mod engine;
mod result;

pub use state::SimulationState;
pub use engine::{fixed_balance, ProjectionConfig, ProjectionEngine};
pub use result::{aggregate, Accrual, MonthRow, ProjectionResult};

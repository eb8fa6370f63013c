//! Scenario runner for batch projections
//!
//! Holds one engine and runs many independent requests through it. Each
//! request is validated on its own and indexed requests fetch their own rate
//! table, so one bad row never affects another.

use rayon::prelude::*;

use crate::error::ProjectionError;
use crate::plan::{BatchRequest, CalculationRequest, RateSpec, RawInput};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use crate::rates::RateTableProvider;

/// Outcome of one batch row
#[derive(Debug)]
pub struct BatchOutcome {
    pub id: String,
    pub result: Result<ProjectionResult, ProjectionError>,
}

/// Runner for single, batch and comparison projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(FocusClient::from_env()?, ProjectionConfig::default());
/// let outcomes = runner.run_batch(&load_requests("requests.csv")?);
/// ```
pub struct ScenarioRunner<P> {
    engine: ProjectionEngine<P>,
}

impl<P: RateTableProvider> ScenarioRunner<P> {
    pub fn new(provider: P, config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(provider, config),
        }
    }

    /// Validate raw input and run it
    pub fn run(&self, input: &RawInput) -> Result<ProjectionResult, ProjectionError> {
        let request = input.validate()?;
        self.engine.project_request(&request)
    }

    /// Run every request in parallel, keeping input order
    pub fn run_batch(&self, requests: &[BatchRequest]) -> Vec<BatchOutcome> {
        log::info!("Running {} projections", requests.len());

        let outcomes: Vec<BatchOutcome> = requests
            .par_iter()
            .map(|req| BatchOutcome {
                id: req.id.clone(),
                result: self.run(&req.input),
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        if failed > 0 {
            log::warn!("{} of {} projections failed", failed, outcomes.len());
        }

        outcomes
    }

    /// Run the same plan under several rate regimes
    pub fn run_scenarios(
        &self,
        base: &CalculationRequest,
        rate_specs: &[RateSpec],
    ) -> Vec<Result<ProjectionResult, ProjectionError>> {
        rate_specs
            .par_iter()
            .map(|spec| {
                self.engine
                    .project(&base.plan, spec, &base.duration, &base.tax_policy)
            })
            .collect()
    }

    pub fn engine(&self) -> &ProjectionEngine<P> {
        &self.engine
    }
}

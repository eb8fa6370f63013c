//! Raw text input and its validation into calculation entities
//!
//! Each field is checked on its own and every failure is collected, so the
//! caller can report all problems at once before the engine runs.

use serde::{Deserialize, Serialize};

use super::{ContributionPlan, Duration, PeriodUnit, RatePeriodUnit, RateSpec, Regime, TaxPolicy};
use crate::error::{ValidationError, ValidationErrors};
use crate::locale::{parse_currency, parse_percentage, parse_period};

pub(super) fn default_rate_period() -> String {
    "annual".to_string()
}

pub(super) fn default_period_unit() -> String {
    "month".to_string()
}

/// Form values as typed by the user (pt-BR formatted)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInput {
    /// e.g. `1.000,00`
    pub initial_deposit: String,

    /// e.g. `100,00`
    pub monthly_contribution: String,

    /// `fixed`, `inflation` or `benchmark`
    pub regime: String,

    /// e.g. `12,5`; may be empty for the benchmark regime
    #[serde(default)]
    pub rate: String,

    #[serde(default = "default_rate_period")]
    pub rate_period: String,

    /// Whole number of periods
    pub period: String,

    #[serde(default = "default_period_unit")]
    pub period_unit: String,

    #[serde(default)]
    pub exempt: bool,
}

/// The four validated entities the engine consumes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculationRequest {
    pub plan: ContributionPlan,
    pub rate_spec: RateSpec,
    pub duration: Duration,
    pub tax_policy: TaxPolicy,
}

impl RawInput {
    /// Validate every field, returning all errors found
    pub fn validate(&self) -> Result<CalculationRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let initial_deposit = record(&mut errors, "initial_deposit", parse_currency(&self.initial_deposit));
        let monthly_contribution = record(
            &mut errors,
            "monthly_contribution",
            parse_currency(&self.monthly_contribution).and_then(|v| {
                if v > 0.0 {
                    Ok(v)
                } else {
                    Err(ValidationError::NonPositiveContribution)
                }
            }),
        );

        let regime = record(&mut errors, "regime", self.regime.parse::<Regime>());

        // Benchmark-indexed plans carry no user rate; an unknown regime is
        // treated as rate-bearing so the rate field is still checked
        let rate_spec = match regime {
            Some(Regime::BenchmarkIndexed) => Some(RateSpec::benchmark_indexed()),
            _ => {
                let rate = record(&mut errors, "rate", parse_percentage(&self.rate, true));
                let rate_period = record(&mut errors, "rate_period", self.rate_period.parse::<RatePeriodUnit>());
                match (regime, rate, rate_period) {
                    (Some(regime), Some(nominal_rate), Some(rate_period)) => Some(RateSpec {
                        regime,
                        nominal_rate,
                        rate_period,
                    }),
                    _ => None,
                }
            }
        };

        let period = record(&mut errors, "period", parse_period(&self.period));
        let period_unit = record(&mut errors, "period_unit", self.period_unit.parse::<PeriodUnit>());
        let duration = match (period, period_unit) {
            (Some(count), Some(unit)) => record(&mut errors, "period", Duration::new(count, unit)),
            _ => None,
        };

        let plan = match (initial_deposit, monthly_contribution) {
            (Some(deposit), Some(contribution)) => {
                record(&mut errors, "monthly_contribution", ContributionPlan::new(deposit, contribution))
            }
            _ => None,
        };

        match (plan, rate_spec, duration) {
            (Some(plan), Some(rate_spec), Some(duration)) if errors.is_empty() => Ok(CalculationRequest {
                plan,
                rate_spec,
                duration,
                tax_policy: TaxPolicy { exempt: self.exempt },
            }),
            _ => Err(errors),
        }
    }
}

fn record<T>(errors: &mut ValidationErrors, field: &'static str, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.push(field, error);
            None
        }
    }
}

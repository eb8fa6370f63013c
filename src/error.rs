//! Error types for input validation and projection runs

use thiserror::Error;

use crate::rates::Indicator;

/// Field-level input problem, reported before the engine runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed currency amount '{0}' (expected e.g. 1.234,56)")]
    MalformedCurrency(String),

    #[error("malformed percentage '{0}' (expected e.g. 12,5)")]
    MalformedPercentage(String),

    #[error("rate must be greater than zero")]
    NonPositiveRate,

    #[error("malformed period '{0}' (expected a whole number)")]
    MalformedPeriod(String),

    #[error("period must be greater than zero")]
    NonPositivePeriod,

    #[error("monthly contribution must be greater than zero")]
    NonPositiveContribution,

    #[error("initial deposit cannot be negative")]
    NegativeDeposit,

    #[error("unknown option '{0}'")]
    UnknownOption(String),
}

/// A validation error tied to the input field that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub error: ValidationError,
}

/// Every field error found in one request
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("invalid input: {}", join_fields(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, error: ValidationError) {
        self.errors.push(FieldError { field, error });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error reported for a given field, if any
    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field == field).map(|e| &e.error)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure of a single projection run
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("rate table unavailable for {indicator}: {reason}")]
    RateTableUnavailable { indicator: Indicator, reason: String },

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("consistency error: net {net:.2} vs gross {gross:.2}")]
    Consistency { gross: f64, net: f64 },
}

impl ProjectionError {
    pub fn rate_table_unavailable(indicator: Indicator, reason: impl Into<String>) -> Self {
        ProjectionError::RateTableUnavailable {
            indicator,
            reason: reason.into(),
        }
    }

    /// Whether the caller can fix the problem by correcting its input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProjectionError::Validation(_))
    }
}

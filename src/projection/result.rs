//! Projection output structures and the result aggregator

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// A single month of a projection schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRow {
    /// Projection month (1-indexed)
    pub month: u32,

    /// Calendar year the month falls in
    pub calendar_year: i32,

    pub contribution: f64,

    /// Annual index forecast used this month, in percent (0 for fixed)
    pub index_rate: f64,

    /// Effective monthly rate applied (decimal)
    pub effective_rate: f64,

    /// Interest credited this month
    pub interest: f64,

    /// Balance at end of month
    pub eop_balance: f64,

    /// Principal paid in so far, including the initial deposit
    pub total_invested: f64,
}

impl MonthRow {
    pub fn new(month: u32, calendar_year: i32) -> Self {
        Self {
            month,
            calendar_year,
            contribution: 0.0,
            index_rate: 0.0,
            effective_rate: 0.0,
            interest: 0.0,
            eop_balance: 0.0,
            total_invested: 0.0,
        }
    }
}

/// Gross side of a projection, before tax
#[derive(Debug, Clone, Default)]
pub struct Accrual {
    pub gross_amount: f64,
    pub total_invested: f64,
    pub schedule: Vec<MonthRow>,
}

impl Accrual {
    pub fn gain(&self) -> f64 {
        self.gross_amount - self.total_invested
    }
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Accumulated value before tax
    pub gross_amount: f64,

    /// Accumulated value after withholding
    pub net_amount: f64,

    /// Initial deposit plus all contributions
    pub total_invested: f64,

    /// Gross amount minus total invested
    pub gain: f64,

    /// Monthly schedule (only when detailed output is requested)
    pub schedule: Vec<MonthRow>,
}

impl ProjectionResult {
    /// Attach the monthly schedule
    pub fn with_schedule(mut self, schedule: Vec<MonthRow>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Amount withheld as tax
    pub fn tax_withheld(&self) -> f64 {
        self.gross_amount - self.net_amount
    }
}

/// Package gross, net and invested amounts into a result
///
/// Fails with `ProjectionError::Consistency` if net exceeds gross or any
/// amount is negative or not a finite number.
pub fn aggregate(
    gross_amount: f64,
    net_amount: f64,
    total_invested: f64,
) -> Result<ProjectionResult, ProjectionError> {
    let valid = gross_amount.is_finite()
        && net_amount.is_finite()
        && total_invested.is_finite()
        && gross_amount >= 0.0
        && net_amount >= 0.0
        && total_invested >= 0.0
        && net_amount <= gross_amount;

    if !valid {
        log::error!(
            "Inconsistent projection result: gross={} net={} invested={}",
            gross_amount,
            net_amount,
            total_invested
        );
        return Err(ProjectionError::Consistency {
            gross: gross_amount,
            net: net_amount,
        });
    }

    Ok(ProjectionResult {
        gross_amount,
        net_amount,
        total_invested,
        gain: gross_amount - total_invested,
        schedule: Vec::new(),
    })
}

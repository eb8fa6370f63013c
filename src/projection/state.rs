//! Running state of a month-by-month simulation

use chrono::{Datelike, Months, NaiveDate};

use crate::error::ProjectionError;
use crate::plan::ContributionPlan;

/// State of the investment at a point in time during simulation
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Current projection month (0 before the first month)
    pub month: u32,

    /// Calendar year of `start_date + month` months
    pub calendar_year: i32,

    /// Balance at end of the current month
    pub balance: f64,

    /// Principal paid in so far
    pub total_invested: f64,

    start_date: NaiveDate,
}

impl SimulationState {
    /// Initialize state from a plan at projection start
    pub fn from_plan(plan: &ContributionPlan, start_date: NaiveDate) -> Self {
        Self {
            month: 0,
            calendar_year: start_date.year(),
            balance: plan.initial_deposit(),
            total_invested: plan.initial_deposit(),
            start_date,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) -> Result<(), ProjectionError> {
        self.month += 1;
        let date = self
            .start_date
            .checked_add_months(Months::new(self.month))
            .ok_or_else(|| {
                ProjectionError::Arithmetic(format!(
                    "date out of range {} months after {}",
                    self.month, self.start_date
                ))
            })?;
        self.calendar_year = date.year();
        Ok(())
    }

    /// Pay in `contribution` and compound at `effective_rate`
    /// Returns the interest credited
    pub fn accrue(&mut self, contribution: f64, effective_rate: f64) -> f64 {
        let pre_interest = self.balance + contribution;
        let eop = pre_interest * (1.0 + effective_rate);

        self.balance = eop;
        self.total_invested += contribution;

        eop - pre_interest
    }
}

//! Validated calculation inputs

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Interest-accrual rule for a calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// Contractual rate, closed-form compounding
    Fixed,
    /// Real spread on top of the inflation forecast
    InflationIndexed,
    /// Tracks the benchmark forecast, no spread
    BenchmarkIndexed,
}

impl Regime {
    /// Whether the user must supply a strictly positive nominal rate
    pub fn requires_rate(&self) -> bool {
        !matches!(self, Regime::BenchmarkIndexed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Fixed => "fixed",
            Regime::InflationIndexed => "inflation",
            Regime::BenchmarkIndexed => "benchmark",
        }
    }
}

impl FromStr for Regime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "pre" => Ok(Regime::Fixed),
            "inflation" | "ipca" => Ok(Regime::InflationIndexed),
            "benchmark" | "cdi" | "selic" => Ok(Regime::BenchmarkIndexed),
            other => Err(ValidationError::UnknownOption(other.to_string())),
        }
    }
}

/// Period the nominal rate is quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatePeriodUnit {
    Monthly,
    Annual,
}

impl FromStr for RatePeriodUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "am" => Ok(RatePeriodUnit::Monthly),
            "annual" | "year" | "aa" => Ok(RatePeriodUnit::Annual),
            other => Err(ValidationError::UnknownOption(other.to_string())),
        }
    }
}

/// Unit of the investment duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodUnit {
    Month,
    Year,
}

impl FromStr for PeriodUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "months" => Ok(PeriodUnit::Month),
            "year" | "years" => Ok(PeriodUnit::Year),
            other => Err(ValidationError::UnknownOption(other.to_string())),
        }
    }
}

/// Money going into the investment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContributionPlan {
    initial_deposit: f64,
    monthly_contribution: f64,
}

impl ContributionPlan {
    /// Create a plan; the deposit may be zero, the contribution may not
    pub fn new(initial_deposit: f64, monthly_contribution: f64) -> Result<Self, ValidationError> {
        if initial_deposit.is_nan() || initial_deposit < 0.0 {
            return Err(ValidationError::NegativeDeposit);
        }
        if monthly_contribution.is_nan() || monthly_contribution <= 0.0 {
            return Err(ValidationError::NonPositiveContribution);
        }
        Ok(Self {
            initial_deposit,
            monthly_contribution,
        })
    }

    pub fn initial_deposit(&self) -> f64 {
        self.initial_deposit
    }

    pub fn monthly_contribution(&self) -> f64 {
        self.monthly_contribution
    }

    /// Principal paid in over `months` months
    pub fn total_invested(&self, months: u32) -> f64 {
        self.initial_deposit + self.monthly_contribution * months as f64
    }
}

/// Rate regime and the user's nominal rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSpec {
    pub regime: Regime,

    /// Percentage; ignored for `BenchmarkIndexed`
    pub nominal_rate: f64,

    pub rate_period: RatePeriodUnit,
}

impl RateSpec {
    pub fn fixed(nominal_rate: f64, rate_period: RatePeriodUnit) -> Self {
        Self {
            regime: Regime::Fixed,
            nominal_rate,
            rate_period,
        }
    }

    /// Inflation-indexed with `real_rate` as the spread over the index
    pub fn inflation_indexed(real_rate: f64, rate_period: RatePeriodUnit) -> Self {
        Self {
            regime: Regime::InflationIndexed,
            nominal_rate: real_rate,
            rate_period,
        }
    }

    pub fn benchmark_indexed() -> Self {
        Self {
            regime: Regime::BenchmarkIndexed,
            nominal_rate: 0.0,
            rate_period: RatePeriodUnit::Annual,
        }
    }

    /// Nominal rate converted to a monthly decimal rate
    /// Annual rates are divided by 12 (no compounding equivalence)
    pub fn monthly_rate(&self) -> f64 {
        if self.regime == Regime::BenchmarkIndexed {
            return 0.0;
        }
        match self.rate_period {
            RatePeriodUnit::Annual => self.nominal_rate / 100.0 / 12.0,
            RatePeriodUnit::Monthly => self.nominal_rate / 100.0,
        }
    }
}

/// How long the money stays invested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Duration {
    period_count: u32,
    period_unit: PeriodUnit,
}

impl Duration {
    pub fn new(period_count: u32, period_unit: PeriodUnit) -> Result<Self, ValidationError> {
        if period_count == 0 {
            return Err(ValidationError::NonPositivePeriod);
        }
        if period_unit == PeriodUnit::Year && period_count.checked_mul(12).is_none() {
            return Err(ValidationError::MalformedPeriod(period_count.to_string()));
        }
        Ok(Self {
            period_count,
            period_unit,
        })
    }

    pub fn months(count: u32) -> Result<Self, ValidationError> {
        Self::new(count, PeriodUnit::Month)
    }

    pub fn years(count: u32) -> Result<Self, ValidationError> {
        Self::new(count, PeriodUnit::Year)
    }

    pub fn period_count(&self) -> u32 {
        self.period_count
    }

    pub fn period_unit(&self) -> PeriodUnit {
        self.period_unit
    }

    /// Duration in months, always >= 1
    pub fn total_months(&self) -> u32 {
        match self.period_unit {
            PeriodUnit::Year => self.period_count * 12,
            PeriodUnit::Month => self.period_count,
        }
    }
}

/// Withholding status of the investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxPolicy {
    pub exempt: bool,
}

impl TaxPolicy {
    pub fn exempt() -> Self {
        Self { exempt: true }
    }

    pub fn taxable() -> Self {
        Self { exempt: false }
    }
}

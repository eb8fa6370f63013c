//! Flat withholding on realized gain
//!
//! A single rate applies regardless of holding period; there is no
//! regressive table. Principal is never taxed and losses yield no credit.

use serde::{Deserialize, Serialize};

/// Default withholding rate on gains
pub const DEFAULT_WITHHOLDING_RATE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculator {
    /// Fraction of positive gain withheld (0.15 = 15%)
    pub withholding_rate: f64,
}

impl Default for TaxCalculator {
    fn default() -> Self {
        Self {
            withholding_rate: DEFAULT_WITHHOLDING_RATE,
        }
    }
}

impl TaxCalculator {
    pub fn new(withholding_rate: f64) -> Self {
        Self { withholding_rate }
    }

    /// Amount withheld on `gain`
    pub fn tax_on(&self, gain: f64, exempt: bool) -> f64 {
        if exempt {
            0.0
        } else {
            gain.max(0.0) * self.withholding_rate
        }
    }

    /// Net amount after withholding
    pub fn apply(&self, gross_amount: f64, gain: f64, exempt: bool) -> f64 {
        if exempt {
            return gross_amount;
        }
        gross_amount - self.tax_on(gain, exempt)
    }
}

/// Net amount using the default 15% withholding
pub fn apply_tax(gross_amount: f64, gain: f64, exempt: bool) -> f64 {
    TaxCalculator::default().apply(gross_amount, gain, exempt)
}

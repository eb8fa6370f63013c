//! Forecast rate tables for the indexed regimes
//!
//! The engine only sees [`RateTableProvider`]. Implementations:
//! - [`FocusClient`]: market-expectations web service (blocking HTTP)
//! - [`StaticRateProvider`]: tables already in memory, or loaded from CSV

mod table;
mod focus;
pub mod loader;

pub use table::{ForecastObservation, RateLookup, RateTable};
pub use focus::{FocusClient, FocusConfig};
pub use loader::{load_observations, load_provider};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// Forecast series an indexed regime follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    /// Consumer-price inflation (IPCA)
    Inflation,
    /// Policy/interbank rate (Selic)
    Benchmark,
}

impl Indicator {
    pub const ALL: [Indicator; 2] = [Indicator::Inflation, Indicator::Benchmark];

    /// Series name used by the forecast service
    pub fn series_name(&self) -> &'static str {
        match self {
            Indicator::Inflation => "IPCA",
            Indicator::Benchmark => "Selic",
        }
    }

    pub fn from_series_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|i| i.series_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.series_name())
    }
}

/// Source of year → rate forecasts
///
/// Called at most once per calculation; implementations must not cache
/// across calls.
pub trait RateTableProvider: Send + Sync {
    /// Forecast table for `indicator`, current year onward
    ///
    /// Fails with `ProjectionError::RateTableUnavailable` when the source
    /// cannot be reached or yields no usable entries.
    fn fetch_rate_table(&self, indicator: Indicator) -> Result<RateTable, ProjectionError>;
}

impl<P: RateTableProvider + ?Sized> RateTableProvider for &P {
    fn fetch_rate_table(&self, indicator: Indicator) -> Result<RateTable, ProjectionError> {
        (**self).fetch_rate_table(indicator)
    }
}

impl<P: RateTableProvider + ?Sized> RateTableProvider for Box<P> {
    fn fetch_rate_table(&self, indicator: Indicator) -> Result<RateTable, ProjectionError> {
        (**self).fetch_rate_table(indicator)
    }
}

/// Provider serving fixed, in-memory tables
#[derive(Debug, Clone, Default)]
pub struct StaticRateProvider {
    tables: HashMap<Indicator, RateTable>,
}

impl StaticRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, indicator: Indicator, table: RateTable) -> Self {
        self.tables.insert(indicator, table);
        self
    }

    /// Group raw records by indicator and apply the dedup policy to each
    pub fn from_observations<I>(observations: I, from_year: i32) -> Self
    where
        I: IntoIterator<Item = ForecastObservation>,
    {
        let mut grouped: HashMap<Indicator, Vec<ForecastObservation>> = HashMap::new();
        for obs in observations {
            match Indicator::from_series_name(&obs.indicator) {
                Some(indicator) => grouped.entry(indicator).or_default().push(obs),
                None => log::debug!("Skipping forecast for unknown indicator {}", obs.indicator),
            }
        }

        let tables = grouped
            .into_iter()
            .map(|(indicator, obs)| (indicator, RateTable::from_observations(obs, from_year)))
            .collect();

        Self { tables }
    }
}

impl RateTableProvider for StaticRateProvider {
    fn fetch_rate_table(&self, indicator: Indicator) -> Result<RateTable, ProjectionError> {
        match self.tables.get(&indicator) {
            Some(table) if !table.is_empty() => Ok(table.clone()),
            Some(_) => Err(ProjectionError::rate_table_unavailable(indicator, "no forecast entries")),
            None => Err(ProjectionError::rate_table_unavailable(indicator, "no table configured")),
        }
    }
}

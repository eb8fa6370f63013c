//! Year-keyed forecast rate table

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One published forecast record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastObservation {
    /// Series name as published (e.g. `IPCA`)
    pub indicator: String,

    /// Date the forecast was published
    pub observation_date: NaiveDate,

    /// Calendar year the forecast refers to
    pub reference_year: i32,

    /// Average annual rate, in percent
    pub average_rate: f64,
}

/// Result of looking up the rate for a calendar year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLookup {
    /// Annual rate in percent
    pub rate: f64,

    /// Year the rate was taken from; differs from the requested year on fallback
    pub source_year: i32,
}

/// Mapping of calendar year to average forecast rate (percent)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<i32, f64>,
}

impl RateTable {
    /// Build a table from raw records
    ///
    /// Records for years before `from_year` are dropped. For each remaining
    /// year only the most recently published record is kept; on equal dates
    /// the first record seen wins.
    pub fn from_observations<I>(observations: I, from_year: i32) -> Self
    where
        I: IntoIterator<Item = ForecastObservation>,
    {
        let mut latest: BTreeMap<i32, (NaiveDate, f64)> = BTreeMap::new();

        for obs in observations {
            if obs.reference_year < from_year || !obs.average_rate.is_finite() {
                continue;
            }
            let newer = latest
                .get(&obs.reference_year)
                .map_or(true, |(date, _)| obs.observation_date > *date);
            if newer {
                latest.insert(obs.reference_year, (obs.observation_date, obs.average_rate));
            }
        }

        Self {
            rates: latest.into_iter().map(|(year, (_, rate))| (year, rate)).collect(),
        }
    }

    /// Build a table directly from `(year, rate)` pairs
    pub fn from_rates<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        Self {
            rates: rates.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Rate published for exactly this year
    pub fn get(&self, year: i32) -> Option<f64> {
        self.rates.get(&year).copied()
    }

    /// Last year covered by the table
    pub fn latest_year(&self) -> Option<i32> {
        self.rates.keys().next_back().copied()
    }

    /// Rate for `year`, falling back to the latest year's forecast
    pub fn lookup(&self, year: i32) -> Option<RateLookup> {
        if let Some(rate) = self.get(year) {
            return Some(RateLookup { rate, source_year: year });
        }
        self.rates
            .iter()
            .next_back()
            .map(|(&source_year, &rate)| RateLookup { rate, source_year })
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.rates.iter().map(|(&y, &r)| (y, r))
    }
}

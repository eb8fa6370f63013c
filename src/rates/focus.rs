//! Market-expectations (Focus) service integration for annual forecasts.

use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use reqwest::blocking::{Client, Request};
use serde::Deserialize;

use super::{ForecastObservation, Indicator, RateTable, RateTableProvider};
use crate::error::ProjectionError;

const DEFAULT_BASE_URL: &str =
    "https://olinda.bcb.gov.br/olinda/servico/Expectativas/versao/v1/odata/ExpectativasMercadoAnuais";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const RECORD_LIMIT: usize = 100;
const SELECT_FIELDS: &str = "Indicador,Data,DataReferencia,Media";

/// Connection settings for the forecast service
#[derive(Debug, Clone)]
pub struct FocusConfig {
    pub base_url: String,
    pub timeout: Duration,

    /// First reference year to request; the current year when unset
    pub from_year: Option<i32>,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            from_year: None,
        }
    }
}

impl FocusConfig {
    /// Defaults overridden by `RATE_FORECAST_URL` and
    /// `RATE_FORECAST_TIMEOUT_SECS` (a `.env` file is honoured)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RATE_FORECAST_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        if let Ok(raw) = std::env::var("RATE_FORECAST_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => log::warn!("Ignoring invalid RATE_FORECAST_TIMEOUT_SECS '{}'", raw),
            }
        }

        config
    }

    pub fn with_from_year(mut self, year: i32) -> Self {
        self.from_year = Some(year);
        self
    }
}

/// Blocking client for the annual market-expectations resource
pub struct FocusClient {
    client: Client,
    config: FocusConfig,
}

impl FocusClient {
    pub fn new(config: FocusConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, reqwest::Error> {
        Self::new(FocusConfig::from_env())
    }

    /// Reference year the tables start from
    pub fn from_year(&self) -> i32 {
        self.config.from_year.unwrap_or_else(|| Local::now().year())
    }

    /// Most recent forecasts for `indicator`, newest first, for years >= `from_year`
    fn build_request(&self, indicator: Indicator, from_year: i32) -> Result<Request, reqwest::Error> {
        let filter = format!(
            "Indicador eq '{}' and DataReferencia ge '{}'",
            indicator.series_name(),
            from_year
        );
        let top = RECORD_LIMIT.to_string();

        self.client
            .get(&self.config.base_url)
            .query(&[
                ("$top", top.as_str()),
                ("$filter", filter.as_str()),
                ("$orderby", "Data desc"),
                ("$format", "json"),
                ("$select", SELECT_FIELDS),
            ])
            .build()
    }

    fn fetch_observations(
        &self,
        indicator: Indicator,
        from_year: i32,
    ) -> Result<Vec<ForecastObservation>, ProjectionError> {
        let unavailable = |reason: String| ProjectionError::rate_table_unavailable(indicator, reason);

        let request = self
            .build_request(indicator, from_year)
            .map_err(|e| unavailable(format!("invalid forecast request: {e}")))?;

        let resp = self
            .client
            .execute(request)
            .map_err(|e| unavailable(format!("forecast request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(unavailable(format!(
                "forecast request failed with status {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| unavailable(format!("failed to read forecast response: {e}")))?;

        parse_response(&body).map_err(|e| unavailable(format!("failed to parse forecast response: {e}")))
    }
}

impl RateTableProvider for FocusClient {
    fn fetch_rate_table(&self, indicator: Indicator) -> Result<RateTable, ProjectionError> {
        let from_year = self.from_year();
        let observations = self.fetch_observations(indicator, from_year)?;
        log::debug!(
            "Fetched {} {} forecast records (years >= {})",
            observations.len(),
            indicator,
            from_year
        );

        build_table(indicator, observations, from_year)
    }
}

fn build_table(
    indicator: Indicator,
    observations: Vec<ForecastObservation>,
    from_year: i32,
) -> Result<RateTable, ProjectionError> {
    let table = RateTable::from_observations(observations, from_year);
    if table.is_empty() {
        return Err(ProjectionError::rate_table_unavailable(
            indicator,
            format!("no forecasts for {from_year} onward"),
        ));
    }
    Ok(table)
}

#[derive(Debug, Deserialize)]
struct ODataResponse {
    value: Vec<ExpectationRecord>,
}

#[derive(Debug, Deserialize)]
struct ExpectationRecord {
    #[serde(rename = "Indicador")]
    indicator: String,
    #[serde(rename = "Data")]
    date: String,
    #[serde(rename = "DataReferencia")]
    reference_year: String,
    #[serde(rename = "Media")]
    average: Option<f64>,
}

/// Decode a service response, skipping records without a usable value
fn parse_response(body: &str) -> Result<Vec<ForecastObservation>, serde_json::Error> {
    let response: ODataResponse = serde_json::from_str(body)?;

    let mut out = Vec::with_capacity(response.value.len());
    for record in response.value {
        let average_rate = match record.average {
            Some(v) if v.is_finite() => v,
            _ => continue,
        };
        let reference_year = match record.reference_year.trim().parse::<i32>() {
            Ok(y) => y,
            Err(_) => {
                log::debug!("Skipping forecast with reference '{}'", record.reference_year);
                continue;
            }
        };
        let observation_date = match NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                log::debug!("Skipping forecast dated '{}'", record.date);
                continue;
            }
        };
        out.push(ForecastObservation {
            indicator: record.indicator,
            observation_date,
            reference_year,
            average_rate,
        });
    }

    Ok(out)
}

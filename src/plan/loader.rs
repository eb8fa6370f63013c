//! Load calculation requests from a CSV file
//!
//! Expected header:
//! `id,initial_deposit,monthly_contribution,regime,rate,rate_period,period,period_unit,exempt`

use super::input::{default_period_unit, default_rate_period};
use super::RawInput;
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// A request row as stored in the batch file
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub id: String,
    pub input: RawInput,
}

/// Raw CSV row matching the batch request columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    initial_deposit: String,
    monthly_contribution: String,
    regime: String,
    #[serde(default)]
    rate: String,
    #[serde(default)]
    rate_period: String,
    period: String,
    #[serde(default)]
    period_unit: String,
    #[serde(default)]
    exempt: String,
}

impl CsvRow {
    fn into_request(self) -> Result<BatchRequest, Box<dyn Error>> {
        let exempt = match self.exempt.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "no" | "0" => false,
            "true" | "yes" | "1" => true,
            other => return Err(format!("Unknown exempt flag for {}: {}", self.id, other).into()),
        };

        let rate_period = if self.rate_period.trim().is_empty() {
            default_rate_period()
        } else {
            self.rate_period
        };
        let period_unit = if self.period_unit.trim().is_empty() {
            default_period_unit()
        } else {
            self.period_unit
        };

        Ok(BatchRequest {
            id: self.id,
            input: RawInput {
                initial_deposit: self.initial_deposit,
                monthly_contribution: self.monthly_contribution,
                regime: self.regime,
                rate: self.rate,
                rate_period,
                period: self.period,
                period_unit,
                exempt,
            },
        })
    }
}

/// Load all requests from a CSV file
pub fn load_requests<P: AsRef<Path>>(path: P) -> Result<Vec<BatchRequest>, Box<dyn Error>> {
    let reader = Reader::from_path(path)?;
    read_requests(reader)
}

/// Load requests from any reader (e.g., string buffer, stdin)
pub fn load_requests_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<BatchRequest>, Box<dyn Error>> {
    read_requests(Reader::from_reader(reader))
}

fn read_requests<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<BatchRequest>, Box<dyn Error>> {
    let mut requests = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        requests.push(row.into_request()?);
    }

    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,initial_deposit,monthly_contribution,regime,rate,rate_period,period,period_unit,exempt
a,\"1.000,00\",\"100,00\",fixed,12,annual,12,month,false
b,\"0,00\",\"250,00\",benchmark,,,2,year,true
";

    #[test]
    fn test_load_requests_from_reader() {
        let requests = load_requests_from_reader(SAMPLE.as_bytes()).expect("Failed to load requests");
        assert_eq!(requests.len(), 2);

        let a = &requests[0];
        assert_eq!(a.id, "a");
        assert_eq!(a.input.initial_deposit, "1.000,00");
        assert_eq!(a.input.rate, "12");
        assert!(!a.input.exempt);

        let b = &requests[1];
        assert_eq!(b.input.regime, "benchmark");
        assert_eq!(b.input.rate_period, "annual");
        assert_eq!(b.input.period_unit, "year");
        assert!(b.input.exempt);
        assert!(b.input.validate().is_ok());
    }

    #[test]
    fn test_blank_units_match_raw_input_defaults() {
        let data = "\
id,initial_deposit,monthly_contribution,regime,rate,rate_period,period,period_unit,exempt
c,\"1,00\",\"1,00\",fixed,1,,6,,
";
        let requests = load_requests_from_reader(data.as_bytes()).unwrap();
        let defaults: RawInput = serde_json::from_str(
            r#"{"initial_deposit": "1,00", "monthly_contribution": "1,00", "regime": "fixed", "period": "6"}"#,
        )
        .unwrap();

        assert_eq!(requests[0].input.rate_period, defaults.rate_period);
        assert_eq!(requests[0].input.period_unit, defaults.period_unit);
        assert!(!requests[0].input.exempt);
    }

    #[test]
    fn test_bad_exempt_flag_is_rejected() {
        let data = "\
id,initial_deposit,monthly_contribution,regime,rate,rate_period,period,period_unit,exempt
x,\"1,00\",\"1,00\",fixed,1,monthly,1,month,maybe
";
        let err = load_requests_from_reader(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }
}

//! CSV-based forecast loader for offline runs
//!
//! Columns: `indicator,observation_date,reference_year,average_rate`

use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{ForecastObservation, StaticRateProvider};

/// Load raw forecast records from a CSV file
pub fn load_observations(path: &Path) -> Result<Vec<ForecastObservation>, Box<dyn Error>> {
    let file = File::open(path)?;
    read_observations(file)
}

/// Load forecast records from any reader
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<ForecastObservation>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut observations = Vec::new();

    for result in reader.deserialize() {
        let record: ForecastObservation = result?;
        observations.push(record);
    }

    Ok(observations)
}

/// Build a provider from a forecast CSV, keeping years from `from_year` on
pub fn load_provider(path: &Path, from_year: i32) -> Result<StaticRateProvider, Box<dyn Error>> {
    let observations = load_observations(path)?;
    log::info!("Loaded {} forecast records from {}", observations.len(), path.display());
    Ok(StaticRateProvider::from_observations(observations, from_year))
}

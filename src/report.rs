//! CSV export of schedules and batch results

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::projection::MonthRow;
use crate::scenario::BatchOutcome;

/// Batch result row as written to disk
#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    id: &'a str,
    status: &'static str,
    gross_amount: Option<f64>,
    net_amount: Option<f64>,
    total_invested: Option<f64>,
    gain: Option<f64>,
    error: Option<String>,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Write a monthly schedule as CSV
pub fn write_schedule_csv<W: Write>(writer: W, rows: &[MonthRow]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_schedule_to_path(path: &Path, rows: &[MonthRow]) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_schedule_csv(file, rows)
}

/// Write batch outcomes as CSV, one row per request; amounts in cents precision
pub fn write_batch_csv<W: Write>(writer: W, outcomes: &[BatchOutcome]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    for outcome in outcomes {
        let record = match &outcome.result {
            Ok(result) => ResultRecord {
                id: &outcome.id,
                status: "ok",
                gross_amount: Some(round_cents(result.gross_amount)),
                net_amount: Some(round_cents(result.net_amount)),
                total_invested: Some(round_cents(result.total_invested)),
                gain: Some(round_cents(result.gain)),
                error: None,
            },
            Err(err) => ResultRecord {
                id: &outcome.id,
                status: "error",
                gross_amount: None,
                net_amount: None,
                total_invested: None,
                gain: None,
                error: Some(err.to_string()),
            },
        };
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    Ok(())
}

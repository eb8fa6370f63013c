//! Run projections for every request in a CSV file
//!
//! Usage: cargo run --bin run_batch -- --input requests.csv --output results.csv

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;

use invest_projection::plan::load_requests;
use invest_projection::rates::{load_provider, FocusClient, FocusConfig, RateTableProvider};
use invest_projection::report::write_batch_csv;
use invest_projection::{ProjectionConfig, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "run_batch", about = "Run a batch of investment projections")]
struct Args {
    /// Request CSV (id,initial_deposit,monthly_contribution,regime,rate,rate_period,period,period_unit,exempt)
    #[arg(long)]
    input: PathBuf,

    /// Where to write the results CSV
    #[arg(long, default_value = "projection_results.csv")]
    output: PathBuf,

    /// Read forecasts from this CSV instead of the forecast service
    #[arg(long)]
    rates_csv: Option<PathBuf>,

    /// Start date (YYYY-MM-DD) shared by every request; defaults to today
    #[arg(long)]
    start_date: Option<NaiveDate>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading requests from {}...", args.input.display());
    let requests = load_requests(&args.input)
        .map_err(|e| anyhow!("failed to load requests from {}: {e}", args.input.display()))?;
    println!("Loaded {} requests in {:?}", requests.len(), start.elapsed());

    let from_year = args
        .start_date
        .unwrap_or_else(|| Local::now().date_naive())
        .year();
    let provider: Box<dyn RateTableProvider> = match &args.rates_csv {
        Some(path) => {
            let provider = load_provider(path, from_year)
                .map_err(|e| anyhow!("failed to load forecasts from {}: {e}", path.display()))?;
            Box::new(provider)
        }
        None => {
            let config = FocusConfig::from_env().with_from_year(from_year);
            Box::new(FocusClient::new(config).context("failed to build forecast client")?)
        }
    };

    let config = ProjectionConfig {
        start_date: args.start_date,
        ..Default::default()
    };
    let runner = ScenarioRunner::new(provider, config);

    let run_start = Instant::now();
    let outcomes = runner.run_batch(&requests);
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    println!(
        "Completed {} projections ({} failed) in {:?}",
        outcomes.len(),
        failed,
        run_start.elapsed()
    );

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    write_batch_csv(file, &outcomes).context("failed to write results")?;
    println!("Results written to: {}", args.output.display());

    Ok(())
}

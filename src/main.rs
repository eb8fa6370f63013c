//! Investment projection CLI
//!
//! Runs a single projection from pt-BR formatted input

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, ValueEnum};

use invest_projection::locale::{format_money, format_rate_percent};
use invest_projection::rates::{load_provider, FocusClient, FocusConfig, RateTableProvider};
use invest_projection::report::write_schedule_to_path;
use invest_projection::{ProjectionConfig, ProjectionEngine, ProjectionError, RawInput};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRegime {
    Fixed,
    Inflation,
    Benchmark,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRatePeriod {
    Monthly,
    Annual,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPeriodUnit {
    Month,
    Year,
}

#[derive(Parser, Debug)]
#[command(name = "invest-projection", about = "Project the gross and net value of an investment plan")]
struct Cli {
    /// Initial deposit, e.g. 1.000,00
    #[arg(long, default_value = "0,00")]
    initial: String,

    /// Monthly contribution, e.g. 100,00
    #[arg(long)]
    monthly: String,

    #[arg(long, value_enum, default_value_t = CliRegime::Fixed)]
    regime: CliRegime,

    /// Nominal rate (or real spread for inflation), e.g. 12,5
    #[arg(long, default_value = "")]
    rate: String,

    #[arg(long, value_enum, default_value_t = CliRatePeriod::Annual)]
    rate_period: CliRatePeriod,

    /// Number of periods
    #[arg(long)]
    period: String,

    #[arg(long, value_enum, default_value_t = CliPeriodUnit::Month)]
    period_unit: CliPeriodUnit,

    /// Investment is exempt from withholding
    #[arg(long)]
    exempt: bool,

    /// Start date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Read forecasts from this CSV instead of the forecast service
    #[arg(long)]
    rates_csv: Option<PathBuf>,

    /// Write the monthly schedule to this CSV file
    #[arg(long)]
    schedule_csv: Option<PathBuf>,
}

impl Cli {
    fn raw_input(&self) -> RawInput {
        RawInput {
            initial_deposit: self.initial.clone(),
            monthly_contribution: self.monthly.clone(),
            regime: match self.regime {
                CliRegime::Fixed => "fixed",
                CliRegime::Inflation => "inflation",
                CliRegime::Benchmark => "benchmark",
            }
            .to_string(),
            rate: self.rate.clone(),
            rate_period: match self.rate_period {
                CliRatePeriod::Monthly => "monthly",
                CliRatePeriod::Annual => "annual",
            }
            .to_string(),
            period: self.period.clone(),
            period_unit: match self.period_unit {
                CliPeriodUnit::Month => "month",
                CliPeriodUnit::Year => "year",
            }
            .to_string(),
            exempt: self.exempt,
        }
    }

    fn provider(&self) -> anyhow::Result<Box<dyn RateTableProvider>> {
        let from_year = self
            .start_date
            .unwrap_or_else(|| Local::now().date_naive())
            .year();
        match &self.rates_csv {
            Some(path) => {
                let provider = load_provider(path, from_year)
                    .map_err(|e| anyhow!("failed to load forecasts from {}: {e}", path.display()))?;
                Ok(Box::new(provider))
            }
            None => {
                let config = FocusConfig::from_env().with_from_year(from_year);
                let client = FocusClient::new(config).context("failed to build forecast client")?;
                Ok(Box::new(client))
            }
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let request = cli.raw_input().validate().map_err(ProjectionError::from)?;

    let config = ProjectionConfig {
        start_date: cli.start_date,
        detailed_output: cli.schedule_csv.is_some(),
        ..Default::default()
    };
    let engine = ProjectionEngine::new(cli.provider()?, config);
    let result = engine.project_request(&request)?;

    println!("Regime:          {}", request.rate_spec.regime.as_str());
    if request.rate_spec.regime.requires_rate() {
        println!("Rate:            {}%", format_rate_percent(request.rate_spec.nominal_rate));
    }
    println!("Months:          {}", request.duration.total_months());
    println!("Total invested:  R$ {}", format_money(result.total_invested));
    println!("Gross amount:    R$ {}", format_money(result.gross_amount));
    println!("Gain:            R$ {}", format_money(result.gain));
    println!("Tax withheld:    R$ {}", format_money(result.tax_withheld()));
    println!("Net amount:      R$ {}", format_money(result.net_amount));

    if let Some(path) = &cli.schedule_csv {
        write_schedule_to_path(path, &result.schedule)
            .with_context(|| format!("failed to write schedule to {}", path.display()))?;
        println!("\nMonthly schedule written to: {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("{err:#}");
            match err.downcast_ref::<ProjectionError>() {
                Some(e) if e.is_recoverable() => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

//! Core projection engine for fixed and indexed investment plans

use chrono::{Local, NaiveDate};
use log::{debug, warn};

use super::result::{aggregate, Accrual, MonthRow, ProjectionResult};
use super::state::SimulationState;
use crate::error::ProjectionError;
use crate::plan::{CalculationRequest, ContributionPlan, Duration, RateSpec, Regime, TaxPolicy};
use crate::rates::{Indicator, RateTableProvider};
use crate::tax::{TaxCalculator, DEFAULT_WITHHOLDING_RATE};

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Date the investment starts; today's local date when `None`
    /// Indexed regimes pick the forecast year from `start_date + month`
    pub start_date: Option<NaiveDate>,

    /// Whether to build the monthly schedule
    pub detailed_output: bool,

    /// Withholding rate on positive gain
    pub withholding_rate: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            detailed_output: false,
            withholding_rate: DEFAULT_WITHHOLDING_RATE,
        }
    }
}

/// Main projection engine
pub struct ProjectionEngine<P> {
    provider: P,
    config: ProjectionConfig,
    tax: TaxCalculator,
}

impl<P: RateTableProvider> ProjectionEngine<P> {
    /// Create a new projection engine with given rate provider and config
    pub fn new(provider: P, config: ProjectionConfig) -> Self {
        let tax = TaxCalculator::new(config.withholding_rate);
        Self { provider, config, tax }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run projection for a validated request
    pub fn project_request(&self, request: &CalculationRequest) -> Result<ProjectionResult, ProjectionError> {
        self.project(&request.plan, &request.rate_spec, &request.duration, &request.tax_policy)
    }

    /// Run projection for a single plan
    pub fn project(
        &self,
        plan: &ContributionPlan,
        rate_spec: &RateSpec,
        duration: &Duration,
        tax_policy: &TaxPolicy,
    ) -> Result<ProjectionResult, ProjectionError> {
        let accrual = match rate_spec.regime {
            Regime::Fixed => self.accrue_fixed(plan, rate_spec, duration)?,
            Regime::InflationIndexed => {
                self.accrue_indexed(plan, duration, Indicator::Inflation, rate_spec.monthly_rate())?
            }
            // No user spread on top of the benchmark
            Regime::BenchmarkIndexed => self.accrue_indexed(plan, duration, Indicator::Benchmark, 0.0)?,
        };

        let gain = accrual.gain();
        let net_amount = self.tax.apply(accrual.gross_amount, gain, tax_policy.exempt);

        debug!(
            "{} projection over {} months: gross={:.2} invested={:.2} net={:.2}",
            rate_spec.regime.as_str(),
            duration.total_months(),
            accrual.gross_amount,
            accrual.total_invested,
            net_amount
        );

        let result = aggregate(accrual.gross_amount, net_amount, accrual.total_invested)?;
        Ok(result.with_schedule(accrual.schedule))
    }

    fn start_date(&self) -> NaiveDate {
        self.config
            .start_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Closed-form accumulation at a constant monthly rate
    /// Contributions are paid at the end of each month
    fn accrue_fixed(
        &self,
        plan: &ContributionPlan,
        rate_spec: &RateSpec,
        duration: &Duration,
    ) -> Result<Accrual, ProjectionError> {
        let rate = rate_spec.monthly_rate();
        let months = duration.total_months();
        let deposit = plan.initial_deposit();
        let contribution = plan.monthly_contribution();

        let gross_amount = fixed_balance(deposit, contribution, rate, months)?;

        let schedule = if self.config.detailed_output {
            self.fixed_schedule(plan, rate, months)?
        } else {
            Vec::new()
        };

        Ok(Accrual {
            gross_amount,
            total_invested: plan.total_invested(months),
            schedule,
        })
    }

    fn fixed_schedule(
        &self,
        plan: &ContributionPlan,
        rate: f64,
        months: u32,
    ) -> Result<Vec<MonthRow>, ProjectionError> {
        let mut state = SimulationState::from_plan(plan, self.start_date());
        let mut rows = Vec::with_capacity(months as usize);
        let mut prior_balance = plan.initial_deposit();

        for _ in 0..months {
            state.advance_month()?;
            let balance = fixed_balance(
                plan.initial_deposit(),
                plan.monthly_contribution(),
                rate,
                state.month,
            )?;

            let mut row = MonthRow::new(state.month, state.calendar_year);
            row.contribution = plan.monthly_contribution();
            row.effective_rate = rate;
            row.interest = balance - prior_balance - plan.monthly_contribution();
            row.eop_balance = balance;
            row.total_invested = plan.total_invested(state.month);
            rows.push(row);

            prior_balance = balance;
        }

        Ok(rows)
    }

    /// Month-by-month accumulation on a forecast index
    ///
    /// Each month: effective = (1 + real) * (1 + index/100/12) - 1, then
    /// balance = (balance + contribution) * (1 + effective).
    fn accrue_indexed(
        &self,
        plan: &ContributionPlan,
        duration: &Duration,
        indicator: Indicator,
        real_monthly_rate: f64,
    ) -> Result<Accrual, ProjectionError> {
        let table = self.provider.fetch_rate_table(indicator)?;
        if table.is_empty() {
            return Err(ProjectionError::rate_table_unavailable(indicator, "no forecast entries"));
        }

        let months = duration.total_months();
        let contribution = plan.monthly_contribution();
        let mut state = SimulationState::from_plan(plan, self.start_date());
        let mut schedule = Vec::new();
        let mut fallback_logged = false;

        for _ in 0..months {
            state.advance_month()?;

            let lookup = table.lookup(state.calendar_year).ok_or_else(|| {
                ProjectionError::rate_table_unavailable(indicator, "no forecast entries")
            })?;
            if lookup.source_year != state.calendar_year && !fallback_logged {
                warn!(
                    "No {} forecast for {}; using {} rate of {:.2}%",
                    indicator, state.calendar_year, lookup.source_year, lookup.rate
                );
                fallback_logged = true;
            }

            let index_monthly_rate = lookup.rate / 100.0 / 12.0;
            let effective_rate = (1.0 + real_monthly_rate) * (1.0 + index_monthly_rate) - 1.0;
            let interest = state.accrue(contribution, effective_rate);

            if self.config.detailed_output {
                let mut row = MonthRow::new(state.month, state.calendar_year);
                row.contribution = contribution;
                row.index_rate = lookup.rate;
                row.effective_rate = effective_rate;
                row.interest = interest;
                row.eop_balance = state.balance;
                row.total_invested = state.total_invested;
                schedule.push(row);
            }
        }

        if !state.balance.is_finite() {
            return Err(ProjectionError::Arithmetic(format!(
                "{} balance overflowed after {} months",
                indicator, months
            )));
        }

        Ok(Accrual {
            gross_amount: state.balance,
            total_invested: state.total_invested,
            schedule,
        })
    }
}

/// Future value of `deposit` plus `months` end-of-month contributions
///
/// A zero rate is special-cased so the annuity factor never divides by zero.
pub fn fixed_balance(deposit: f64, contribution: f64, monthly_rate: f64, months: u32) -> Result<f64, ProjectionError> {
    if monthly_rate == 0.0 {
        return Ok(deposit + contribution * months as f64);
    }
    if !monthly_rate.is_finite() || monthly_rate <= -1.0 {
        return Err(ProjectionError::Arithmetic(format!(
            "invalid monthly rate {}",
            monthly_rate
        )));
    }

    let periods = i32::try_from(months)
        .map_err(|_| ProjectionError::Arithmetic(format!("{} months is too long", months)))?;
    let growth = (1.0 + monthly_rate).powi(periods);
    let balance = deposit * growth + contribution * ((growth - 1.0) / monthly_rate);

    if !balance.is_finite() {
        return Err(ProjectionError::Arithmetic(format!(
            "balance overflowed at {:.4} monthly over {} months",
            monthly_rate, months
        )));
    }

    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::RatePeriodUnit;
    use crate::rates::{RateTable, StaticRateProvider};
    use approx::assert_abs_diff_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn engine(provider: StaticRateProvider) -> ProjectionEngine<StaticRateProvider> {
        let config = ProjectionConfig {
            start_date: Some(start()),
            ..Default::default()
        };
        ProjectionEngine::new(provider, config)
    }

    fn fixed_engine() -> ProjectionEngine<StaticRateProvider> {
        engine(StaticRateProvider::new())
    }

    fn plan() -> ContributionPlan {
        ContributionPlan::new(1000.0, 100.0).unwrap()
    }

    /// Provider that counts how often it is asked for a table
    struct CountingProvider {
        inner: StaticRateProvider,
        calls: AtomicUsize,
    }

    impl RateTableProvider for CountingProvider {
        fn fetch_rate_table(&self, indicator: Indicator) -> Result<RateTable, ProjectionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_rate_table(indicator)
        }
    }

    #[test]
    fn test_fixed_annual_rate_scenario() {
        let result = fixed_engine()
            .project(
                &plan(),
                &RateSpec::fixed(12.0, RatePeriodUnit::Annual),
                &Duration::months(12).unwrap(),
                &TaxPolicy::taxable(),
            )
            .unwrap();

        assert_abs_diff_eq!(result.gross_amount, 2395.08, epsilon = 0.01);
        assert_abs_diff_eq!(result.total_invested, 2200.0);
        assert_abs_diff_eq!(result.gain, 195.08, epsilon = 0.01);
        assert_abs_diff_eq!(result.net_amount, 2365.82, epsilon = 0.01);
        assert!(result.schedule.is_empty());
    }

    #[test]
    fn test_fixed_exempt_scenario() {
        let result = fixed_engine()
            .project(
                &plan(),
                &RateSpec::fixed(12.0, RatePeriodUnit::Annual),
                &Duration::months(12).unwrap(),
                &TaxPolicy::exempt(),
            )
            .unwrap();

        assert_eq!(result.net_amount, result.gross_amount);
        assert_abs_diff_eq!(result.gross_amount, 2395.08, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_is_exact() {
        let result = fixed_engine()
            .project(
                &ContributionPlan::new(1234.56, 78.9).unwrap(),
                &RateSpec::fixed(0.0, RatePeriodUnit::Monthly),
                &Duration::years(3).unwrap(),
                &TaxPolicy::taxable(),
            )
            .unwrap();

        let expected = 1234.56 + 78.9 * 36.0;
        assert_eq!(result.gross_amount, expected);
        assert_eq!(result.net_amount, expected);
        assert_eq!(result.gain, 0.0);
    }

    #[test]
    fn test_fixed_monotonic_in_each_input() {
        let base = fixed_balance(1000.0, 100.0, 0.01, 12).unwrap();

        assert!(fixed_balance(1500.0, 100.0, 0.01, 12).unwrap() > base);
        assert!(fixed_balance(1000.0, 150.0, 0.01, 12).unwrap() > base);
        assert!(fixed_balance(1000.0, 100.0, 0.01, 13).unwrap() > base);
        assert!(fixed_balance(1000.0, 100.0, 0.011, 12).unwrap() > base);

        let mut previous = 0.0;
        for months in 1..=120 {
            let balance = fixed_balance(0.0, 50.0, 0.005, months).unwrap();
            assert!(balance > previous);
            previous = balance;
        }
    }

    #[test]
    fn test_fixed_is_deterministic_and_skips_provider() {
        let provider = CountingProvider {
            inner: StaticRateProvider::new(),
            calls: AtomicUsize::new(0),
        };
        let engine = ProjectionEngine::new(&provider, ProjectionConfig::default());
        let spec = RateSpec::fixed(0.9, RatePeriodUnit::Monthly);
        let duration = Duration::years(10).unwrap();

        let first = engine.project(&plan(), &spec, &duration, &TaxPolicy::taxable()).unwrap();
        let second = engine.project(&plan(), &spec, &duration, &TaxPolicy::taxable()).unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fixed_overflow_is_arithmetic_error() {
        let err = fixed_balance(1.0, 1.0, 10.0, 100_000).unwrap_err();
        assert!(matches!(err, ProjectionError::Arithmetic(_)));
    }

    #[test]
    fn test_fixed_schedule_matches_closed_form() {
        let config = ProjectionConfig {
            start_date: Some(start()),
            detailed_output: true,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(StaticRateProvider::new(), config);

        let result = engine
            .project(
                &plan(),
                &RateSpec::fixed(1.0, RatePeriodUnit::Monthly),
                &Duration::months(12).unwrap(),
                &TaxPolicy::taxable(),
            )
            .unwrap();

        assert_eq!(result.schedule.len(), 12);
        let last = result.schedule.last().unwrap();
        assert_abs_diff_eq!(last.eop_balance, result.gross_amount, epsilon = 1e-9);
        assert_abs_diff_eq!(last.total_invested, 2200.0);

        let interest: f64 = result.schedule.iter().map(|r| r.interest).sum();
        assert_abs_diff_eq!(interest, result.gain, epsilon = 1e-6);
    }

    #[test]
    fn test_benchmark_constant_rate_is_annuity_due() {
        let provider = StaticRateProvider::new()
            .with_table(Indicator::Benchmark, RateTable::from_rates(vec![(2026, 12.0), (2027, 12.0)]));

        let result = engine(provider)
            .project(
                &plan(),
                &RateSpec::benchmark_indexed(),
                &Duration::months(12).unwrap(),
                &TaxPolicy::exempt(),
            )
            .unwrap();

        let growth: f64 = 1.01_f64.powi(12);
        let expected = 1000.0 * growth + 100.0 * 1.01 * (growth - 1.0) / 0.01;
        assert_abs_diff_eq!(result.gross_amount, expected, epsilon = 1e-6);
        assert_abs_diff_eq!(result.total_invested, 2200.0);
    }

    #[test]
    fn test_benchmark_ignores_nominal_rate() {
        let provider = StaticRateProvider::new()
            .with_table(Indicator::Benchmark, RateTable::from_rates(vec![(2026, 10.0)]));
        let engine = engine(provider);
        let duration = Duration::months(6).unwrap();

        let plain = engine
            .project(&plan(), &RateSpec::benchmark_indexed(), &duration, &TaxPolicy::taxable())
            .unwrap();
        let with_rate = engine
            .project(
                &plan(),
                &RateSpec {
                    nominal_rate: 50.0,
                    ..RateSpec::benchmark_indexed()
                },
                &duration,
                &TaxPolicy::taxable(),
            )
            .unwrap();

        assert_eq!(plain, with_rate);
    }

    #[test]
    fn test_inflation_combines_real_rate_and_index() {
        let provider = StaticRateProvider::new()
            .with_table(Indicator::Inflation, RateTable::from_rates(vec![(2026, 4.8)]));

        let result = engine(provider)
            .project(
                &ContributionPlan::new(0.0, 100.0).unwrap(),
                &RateSpec::inflation_indexed(6.0, RatePeriodUnit::Annual),
                &Duration::months(3).unwrap(),
                &TaxPolicy::taxable(),
            )
            .unwrap();

        let effective = (1.0 + 0.005) * (1.0 + 0.004) - 1.0;
        let mut balance = 0.0;
        for _ in 0..3 {
            balance = (balance + 100.0) * (1.0 + effective);
        }
        assert_abs_diff_eq!(result.gross_amount, balance, epsilon = 1e-9);
        assert_abs_diff_eq!(result.net_amount, balance - 0.15 * (balance - 300.0), epsilon = 1e-9);
    }

    #[test]
    fn test_indexed_uses_rate_of_each_calendar_year() {
        let provider = StaticRateProvider::new()
            .with_table(Indicator::Benchmark, RateTable::from_rates(vec![(2026, 12.0), (2027, 24.0)]));
        let config = ProjectionConfig {
            start_date: NaiveDate::from_ymd_opt(2026, 11, 15),
            detailed_output: true,
            ..Default::default()
        };

        let result = ProjectionEngine::new(provider, config)
            .project(
                &ContributionPlan::new(0.0, 100.0).unwrap(),
                &RateSpec::benchmark_indexed(),
                &Duration::months(3).unwrap(),
                &TaxPolicy::exempt(),
            )
            .unwrap();

        let years: Vec<i32> = result.schedule.iter().map(|r| r.calendar_year).collect();
        assert_eq!(years, vec![2026, 2027, 2027]);
        let rates: Vec<f64> = result.schedule.iter().map(|r| r.index_rate).collect();
        assert_eq!(rates, vec![12.0, 24.0, 24.0]);

        let expected = ((100.0 * 1.01 + 100.0) * 1.02 + 100.0) * 1.02;
        assert_abs_diff_eq!(result.gross_amount, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_indexed_falls_back_to_latest_year() {
        let provider = StaticRateProvider::new()
            .with_table(Indicator::Benchmark, RateTable::from_rates(vec![(2026, 12.0)]));

        let result = engine(provider)
            .project(
                &plan(),
                &RateSpec::benchmark_indexed(),
                &Duration::years(3).unwrap(),
                &TaxPolicy::taxable(),
            )
            .unwrap();

        let growth: f64 = 1.01_f64.powi(36);
        let expected = 1000.0 * growth + 100.0 * 1.01 * (growth - 1.0) / 0.01;
        assert_abs_diff_eq!(result.gross_amount, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_indexed_fails_without_table() {
        let provider = StaticRateProvider::new()
            .with_table(Indicator::Inflation, RateTable::default());

        let err = engine(provider)
            .project(
                &plan(),
                &RateSpec::inflation_indexed(5.0, RatePeriodUnit::Annual),
                &Duration::months(12).unwrap(),
                &TaxPolicy::taxable(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ProjectionError::RateTableUnavailable { indicator: Indicator::Inflation, .. }
        ));
    }

    #[test]
    fn test_indexed_fetches_table_once() {
        let provider = CountingProvider {
            inner: StaticRateProvider::new()
                .with_table(Indicator::Inflation, RateTable::from_rates(vec![(2026, 4.0)])),
            calls: AtomicUsize::new(0),
        };
        let engine = ProjectionEngine::new(
            &provider,
            ProjectionConfig {
                start_date: Some(start()),
                ..Default::default()
            },
        );

        engine
            .project(
                &plan(),
                &RateSpec::inflation_indexed(5.0, RatePeriodUnit::Annual),
                &Duration::years(5).unwrap(),
                &TaxPolicy::taxable(),
            )
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_negative_index_loss_is_not_taxed() {
        let provider = StaticRateProvider::new()
            .with_table(Indicator::Benchmark, RateTable::from_rates(vec![(2026, -6.0)]));

        let result = engine(provider)
            .project(
                &plan(),
                &RateSpec::benchmark_indexed(),
                &Duration::months(6).unwrap(),
                &TaxPolicy::taxable(),
            )
            .unwrap();

        assert!(result.gain < 0.0);
        assert_eq!(result.net_amount, result.gross_amount);
    }
}

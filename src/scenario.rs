//! Forecast runner
//!
//! Holds the entered retention assumptions once, then runs any number of
//! forecasts (different launch dates, horizons, cohort sizes) against them.

use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::assumptions::{load_assumptions_path, AssumptionSet, YearAssumptions};
use crate::config::ForecastConfig;
use crate::curve::{curve_series, CurveSeries};
use crate::error::RpdError;
use crate::projection::{aggregate, RevenueProjector, RevenueTable, YearlyRpd};

/// Result of one forecast run
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Yearly cumulative RPD, ascending by year
    pub yearly: Vec<YearlyRpd>,

    /// Full daily revenue table, for export
    #[serde(skip)]
    pub table: RevenueTable,
}

/// Pre-loaded runner for repeated forecasts
///
/// # Example
/// ```ignore
/// let runner = ForecastRunner::new();
/// for years in [3, 5, 10] {
///     let config = ForecastConfig { forecast_years: years, ..Default::default() };
///     let forecast = runner.run(&config)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ForecastRunner {
    /// Assumptions as entered (one year for uniform mode, or per year)
    assumptions: AssumptionSet,
}

impl ForecastRunner {
    /// Runner with the default pricing assumptions, applied uniformly
    pub fn new() -> Self {
        let mut assumptions = AssumptionSet::new();
        assumptions.insert(ForecastConfig::default().start_year(), YearAssumptions::default_pricing());
        Self { assumptions }
    }

    /// Runner with pre-built assumptions; logs share-sum warnings per entered year
    pub fn with_assumptions(assumptions: AssumptionSet) -> Self {
        assumptions.warn_share_sums();
        Self { assumptions }
    }

    /// Assumptions from the config: file path first, then inline, then defaults
    pub fn from_config(config: &ForecastConfig) -> Result<Self, RpdError> {
        if let Some(path) = &config.assumptions_path {
            info!("Loading assumptions from {}", path.display());
            return Ok(Self::with_assumptions(load_assumptions_path(path)?));
        }
        if let Some(inline) = &config.assumptions {
            return Ok(Self::with_assumptions(inline.clone()));
        }
        let mut assumptions = AssumptionSet::new();
        assumptions.insert(config.start_year(), YearAssumptions::default_pricing());
        Ok(Self::with_assumptions(assumptions))
    }

    /// Expand the entered assumptions to one entry per forecast year
    pub fn dense_assumptions(&self, config: &ForecastConfig) -> Result<AssumptionSet, RpdError> {
        let dense = self
            .assumptions
            .expand(config.mode, config.start_year(), config.end_year())?;
        dense.validate()?;
        Ok(dense)
    }

    /// Project and aggregate one forecast
    pub fn run(&self, config: &ForecastConfig) -> Result<Forecast, RpdError> {
        config.validate()?;
        let start_date = config.start_date();
        let end_date = config.end_date()?;
        let dense = self.dense_assumptions(config)?;

        let projector = RevenueProjector::new(dense, config.projection_config());
        let table = projector.project(start_date, end_date)?;
        let yearly = aggregate(&table, config.start_year(), config.end_year())?;

        info!(
            "Forecast {}..{}: {} cohorts, final RPD {:.2}",
            start_date,
            end_date,
            table.len(),
            yearly.last().map(|y| y.rpd).unwrap_or(0.0)
        );

        Ok(Forecast { start_date, end_date, yearly, table })
    }

    /// Run several configurations against the same assumptions
    pub fn run_batch(&self, configs: &[ForecastConfig]) -> Vec<Result<Forecast, RpdError>> {
        configs.iter().map(|config| self.run(config)).collect()
    }

    /// Fitted curves for charting, one per period (uniform) or per year and period
    pub fn curves(&self, config: &ForecastConfig, samples: usize) -> Result<Vec<CurveSeries>, RpdError> {
        let dense = self.dense_assumptions(config)?;
        Ok(curve_series(&dense, config.mode, samples)?)
    }

    pub fn assumptions(&self) -> &AssumptionSet {
        &self.assumptions
    }

    pub fn assumptions_mut(&mut self) -> &mut AssumptionSet {
        &mut self.assumptions
    }
}

impl Default for ForecastRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{ParameterMode, PeriodAssumption, PeriodType};
    use crate::error::AssumptionError;

    fn short_config(years: u32) -> ForecastConfig {
        ForecastConfig {
            forecast_years: years,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_forecast() {
        let runner = ForecastRunner::new();
        let forecast = runner.run(&short_config(2)).unwrap();

        assert_eq!(forecast.yearly.len(), 2);
        assert_eq!(forecast.yearly[0].year, 2024);
        assert!(forecast.yearly[0].growth_rate.is_none());
        assert!(forecast.yearly[1].growth_rate.is_some());
        assert_eq!(forecast.table.len(), 731);

        // Renewals only add revenue on top of the day-0 purchase
        assert!(forecast.yearly.iter().all(|y| y.rpd >= 1.0));
    }

    #[test]
    fn test_batch_longer_horizon_keeps_prefix() {
        let runner = ForecastRunner::new();
        let results = runner.run_batch(&[short_config(1), short_config(2)]);
        let one = results[0].as_ref().unwrap();
        let two = results[1].as_ref().unwrap();

        // Revenue realized by end of 2024 does not depend on the horizon
        assert_eq!(one.yearly[0].cumulative_users, two.yearly[0].cumulative_users);
        approx::assert_relative_eq!(one.yearly[0].rpd, two.yearly[0].rpd, max_relative = 1e-12);
    }

    #[test]
    fn test_better_retention_raises_rpd() {
        let mut better = YearAssumptions::default_pricing();
        better.year = PeriodAssumption::new(vec![0.95, 0.9, 0.85], 0.4);

        let base = ForecastRunner::new().run(&short_config(2)).unwrap();
        let improved = ForecastRunner::with_assumptions(AssumptionSet::uniform(better, 2024, 2024))
            .run(&short_config(2))
            .unwrap();
        assert!(improved.yearly[1].rpd > base.yearly[1].rpd);
    }

    #[test]
    fn test_per_year_mode_requires_each_year() {
        let config = ForecastConfig {
            mode: ParameterMode::PerYear,
            ..short_config(2)
        };
        let err = ForecastRunner::new().run(&config).unwrap_err();
        assert!(matches!(err, RpdError::Assumption(AssumptionError::MissingYear(2025))));
    }

    #[test]
    fn test_inline_assumptions_from_config() {
        let year = YearAssumptions::all_inactive()
            .with(PeriodType::Year, PeriodAssumption::new(vec![0.8, 0.7, 0.6], 1.0));
        let config = ForecastConfig {
            assumptions: Some(AssumptionSet::uniform(year, 2024, 2024)),
            ..short_config(1)
        };
        let runner = ForecastRunner::from_config(&config).unwrap();
        let forecast = runner.run(&config).unwrap();

        // 2024 is a leap year: only the Jan 1 cohort renews (on Dec 31)
        let curves = runner.curves(&config, 10).unwrap();
        let yearly = curves.iter().find(|s| s.period == PeriodType::Year).unwrap();
        let expected = (366.0 * 1000.0 + 1000.0 * yearly.curve.evaluate(1.0)) / (366.0 * 1000.0);
        approx::assert_relative_eq!(forecast.yearly[0].rpd, expected, max_relative = 1e-12);
    }
}

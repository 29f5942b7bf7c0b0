//! Revenue projector: builds the daily revenue table for a date range

use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::cache::{CurveCache, PricedCurve};
use super::table::{CohortRow, RevenueTable};
use crate::assumptions::{AssumptionSet, PeriodType};
use crate::error::ProjectionError;

/// Users activated per day when not configured
pub const DEFAULT_DAILY_ACTIVATIONS: f64 = 1000.0;

/// Day-0 revenue of each daily cohort when not configured
pub const DEFAULT_BASE_REVENUE: f64 = 1000.0;

/// Cohort sizing for a projection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Users activated on every date in the range
    pub daily_activations: f64,

    /// Revenue a cohort books on its activation day. Renewal revenue for a
    /// period is this amount times the period's share times its renewal rate.
    pub base_revenue: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            daily_activations: DEFAULT_DAILY_ACTIVATIONS,
            base_revenue: DEFAULT_BASE_REVENUE,
        }
    }
}

/// Main projection engine
pub struct RevenueProjector {
    assumptions: AssumptionSet,
    config: ProjectionConfig,
}

impl RevenueProjector {
    /// Create a projector over a dense year -> assumptions map
    pub fn new(assumptions: AssumptionSet, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn assumptions(&self) -> &AssumptionSet {
        &self.assumptions
    }

    /// Project revenue for every cohort activated in `[start_date, end_date]`
    pub fn project(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<RevenueTable, ProjectionError> {
        if end_date < start_date {
            return Err(ProjectionError::InvalidDateRange { start: start_date, end: end_date });
        }

        let cache = CurveCache::build(&self.assumptions, start_date.year()..=end_date.year())?;

        let num_days = (end_date - start_date).num_days() as usize + 1;
        info!(
            "Projecting {} cohorts from {} to {} ({} cells)",
            num_days,
            start_date,
            end_date,
            num_days * (num_days + 1) / 2
        );

        let dates: Vec<NaiveDate> = start_date.iter_days().take(num_days).collect();

        // Rows are independent; the cache is read-only from here on
        let rows = dates
            .par_iter()
            .map(|&date| {
                let curves = cache
                    .year_curves(date.year())
                    .ok_or(ProjectionError::MissingYear(date.year()))?;
                let remaining = (end_date - date).num_days() as u32;
                Ok(self.project_cohort(date, remaining, &curves))
            })
            .collect::<Result<Vec<CohortRow>, ProjectionError>>()?;

        debug!("Projection complete: {} rows", rows.len());
        Ok(RevenueTable::new(start_date, end_date, rows))
    }

    /// Revenue for one cohort at offsets `0..=remaining_days`
    fn project_cohort(
        &self,
        activation_date: NaiveDate,
        remaining_days: u32,
        curves: &[(PeriodType, PricedCurve); 4],
    ) -> CohortRow {
        let base = self.config.base_revenue;
        let mut revenue = Vec::with_capacity(remaining_days as usize + 1);

        // Day 0: initial purchase, independent of retention
        revenue.push(base);

        for day in 1..=remaining_days {
            // Fold from +0.0: an empty f64 `sum()` is -0.0 and prints as "-0"
            let total = curves
                .iter()
                .filter(|(period, _)| period.is_renewal_day(day))
                .map(|(period, priced)| {
                    base * priced.revenue_share * priced.curve.rate_at_day(day, *period)
                })
                .fold(0.0, |acc, r| acc + r);
            revenue.push(total);
        }

        CohortRow {
            activation_date,
            activations: self.config.daily_activations,
            revenue,
        }
    }
}

/// Project with the default base revenue
pub fn project(
    daily_activations: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    assumptions: &AssumptionSet,
) -> Result<RevenueTable, ProjectionError> {
    let config = ProjectionConfig {
        daily_activations,
        ..Default::default()
    };
    RevenueProjector::new(assumptions.clone(), config).project(start_date, end_date)
}

//! Memoized curve fits for one projection run
//!
//! Fitting is pure, so each (cohort year, period type) is fitted once and the
//! result reused for every cohort activated in that year.

use log::debug;
use std::collections::HashMap;

use crate::assumptions::{AssumptionSet, PeriodType};
use crate::curve::{fit_period, RetentionCurve};
use crate::error::ProjectionError;

/// A fitted curve together with the revenue share it applies to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedCurve {
    pub curve: RetentionCurve,
    pub revenue_share: f64,
}

/// Fitted curves keyed by (year, period type)
#[derive(Debug, Clone, Default)]
pub struct CurveCache {
    entries: HashMap<(i32, PeriodType), PricedCurve>,
}

impl CurveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit every period type for each year in `years`
    pub fn build(
        assumptions: &AssumptionSet,
        years: impl IntoIterator<Item = i32>,
    ) -> Result<Self, ProjectionError> {
        let mut cache = Self::new();
        for year in years {
            for period in PeriodType::ALL {
                cache.get_or_fit(assumptions, year, period)?;
            }
        }
        debug!("fitted {} retention curves", cache.len());
        Ok(cache)
    }

    /// Cached curve, fitting it on first use
    pub fn get_or_fit(
        &mut self,
        assumptions: &AssumptionSet,
        year: i32,
        period: PeriodType,
    ) -> Result<PricedCurve, ProjectionError> {
        if let Some(entry) = self.entries.get(&(year, period)) {
            return Ok(*entry);
        }

        let observed = assumptions
            .get(year)
            .ok_or(ProjectionError::MissingYear(year))?
            .get(period);
        let curve = fit_period(period, &observed.rates)
            .map_err(|source| ProjectionError::Fit { year, period, source })?;

        let entry = PricedCurve {
            curve,
            revenue_share: observed.revenue_share,
        };
        self.entries.insert((year, period), entry);
        Ok(entry)
    }

    pub fn get(&self, year: i32, period: PeriodType) -> Option<&PricedCurve> {
        self.entries.get(&(year, period))
    }

    /// All four period curves for a year, in `PeriodType::ALL` order
    pub fn year_curves(&self, year: i32) -> Option<[(PeriodType, PricedCurve); 4]> {
        let mut out = [(PeriodType::Week, PricedCurve { curve: RetentionCurve::INACTIVE, revenue_share: 0.0 }); 4];
        for (slot, period) in out.iter_mut().zip(PeriodType::ALL) {
            *slot = (period, *self.get(year, period)?);
        }
        Some(out)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::YearAssumptions;
    use crate::error::FitError;

    #[test]
    fn test_build_fits_each_year_and_period() {
        let set = AssumptionSet::uniform(YearAssumptions::default_pricing(), 2024, 2025);
        let cache = CurveCache::build(&set, 2024..=2025).unwrap();
        assert_eq!(cache.len(), 8);

        let yearly = cache.get(2025, PeriodType::Year).unwrap();
        assert_eq!(yearly.revenue_share, 0.4);
        assert!(yearly.curve.b < 0.0);

        let curves = cache.year_curves(2024).unwrap();
        assert_eq!(curves[2].0, PeriodType::Quarter);
    }

    #[test]
    fn test_missing_year() {
        let set = AssumptionSet::uniform(YearAssumptions::default_pricing(), 2024, 2024);
        let err = CurveCache::build(&set, 2024..=2025).unwrap_err();
        assert!(matches!(err, ProjectionError::MissingYear(2025)));
    }

    #[test]
    fn test_fit_error_names_year_and_period() {
        let mut year = YearAssumptions::default_pricing();
        year.month.rates = vec![0.5, 0.6, 0.7];
        let set = AssumptionSet::uniform(year, 2024, 2024);

        let err = CurveCache::build(&set, [2024]).unwrap_err();
        match err {
            ProjectionError::Fit { year, period, source } => {
                assert_eq!(year, 2024);
                assert_eq!(period, PeriodType::Month);
                assert!(matches!(source, FitError::NonDecaying { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Sampled retention curves for charting

use serde::{Deserialize, Serialize};

use super::{fit_period, RetentionCurve};
use crate::assumptions::{AssumptionSet, ParameterMode, PeriodType};
use crate::error::ProjectionError;

/// Number of evenly spaced samples per fitted curve
pub const DEFAULT_SAMPLES: usize = 100;

/// Observed checkpoints and the fitted curve sampled over a period's horizon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveSeries {
    pub period: PeriodType,
    /// Cohort year, `None` when one curve stands for every year
    pub year: Option<i32>,
    pub curve: RetentionCurve,
    /// (checkpoint, observed rate)
    pub observed: Vec<(f64, f64)>,
    /// (period, fitted rate)
    pub fitted: Vec<(f64, f64)>,
}

/// `samples` evenly spaced points from 1 to `horizon` inclusive
fn linspace(horizon: f64, samples: usize) -> Vec<f64> {
    match samples {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let step = (horizon - 1.0) / (samples - 1) as f64;
            (0..samples).map(|i| 1.0 + step * i as f64).collect()
        }
    }
}

/// Sample a fitted curve at `samples` points from period 1 to `horizon`
pub fn sample_curve(curve: &RetentionCurve, horizon: f64, samples: usize) -> Vec<(f64, f64)> {
    linspace(horizon, samples)
        .into_iter()
        .map(|p| (p, curve.evaluate(p)))
        .collect()
}

fn build_series(
    period: PeriodType,
    year: i32,
    label_year: Option<i32>,
    rates: &[f64],
    samples: usize,
) -> Result<CurveSeries, ProjectionError> {
    let curve = fit_period(period, rates).map_err(|source| ProjectionError::Fit {
        year,
        period,
        source,
    })?;

    Ok(CurveSeries {
        period,
        year: label_year,
        curve,
        observed: period.checkpoints().iter().copied().zip(rates.iter().copied()).collect(),
        fitted: sample_curve(&curve, period.plot_horizon(), samples),
    })
}

/// Fitted curves for every period type.
///
/// Uniform mode yields one series per period from the first year; per-year
/// mode yields one series per (year, period).
pub fn curve_series(
    assumptions: &AssumptionSet,
    mode: ParameterMode,
    samples: usize,
) -> Result<Vec<CurveSeries>, ProjectionError> {
    let mut series = Vec::new();

    match mode {
        ParameterMode::Uniform => {
            if let Some((year, entry)) = assumptions.iter().next() {
                for period in PeriodType::ALL {
                    series.push(build_series(period, year, None, &entry.get(period).rates, samples)?);
                }
            }
        }
        ParameterMode::PerYear => {
            for period in PeriodType::ALL {
                for (year, entry) in assumptions.iter() {
                    series.push(build_series(period, year, Some(year), &entry.get(period).rates, samples)?);
                }
            }
        }
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::YearAssumptions;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace_endpoints() {
        let points = linspace(104.0, DEFAULT_SAMPLES);
        assert_eq!(points.len(), 100);
        assert_eq!(points[0], 1.0);
        assert_relative_eq!(points[99], 104.0, epsilon = 1e-9);
    }

    #[test]
    fn test_uniform_series_one_per_period() {
        let set = AssumptionSet::uniform(YearAssumptions::default_pricing(), 2024, 2026);
        let series = curve_series(&set, ParameterMode::Uniform, 50).unwrap();

        assert_eq!(series.len(), 4);
        for s in &series {
            assert!(s.year.is_none());
            assert_eq!(s.fitted.len(), 50);
            assert_eq!(s.observed.len(), s.period.checkpoints().len());
            // Decaying curves are non-increasing across the horizon
            assert!(s.fitted.windows(2).all(|w| w[1].1 <= w[0].1));
        }
    }

    #[test]
    fn test_per_year_series() {
        let set = AssumptionSet::uniform(YearAssumptions::default_pricing(), 2024, 2025);
        let series = curve_series(&set, ParameterMode::PerYear, 10).unwrap();
        assert_eq!(series.len(), 8);
        assert_eq!(series[0].year, Some(2024));
        assert_eq!(series[1].year, Some(2025));
    }

    #[test]
    fn test_inactive_period_samples_zero() {
        let set = AssumptionSet::uniform(YearAssumptions::all_inactive(), 2024, 2024);
        let series = curve_series(&set, ParameterMode::Uniform, 5).unwrap();
        assert!(series.iter().all(|s| s.fitted.iter().all(|&(_, r)| r == 0.0)));
    }
}

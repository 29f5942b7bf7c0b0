//! Observed renewal rates and revenue shares for one cohort year

use serde::{Deserialize, Serialize};

use super::PeriodType;
use crate::error::AssumptionError;

/// Tolerance on the per-year revenue-share sum before a warning is logged
pub const SHARE_SUM_TOLERANCE: f64 = 0.001;

/// Renewal observations and revenue share for one payment period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAssumption {
    /// Renewal rate at each of the period's checkpoints
    pub rates: Vec<f64>,

    /// Fraction of day-0 base revenue attributable to this period's plans
    pub revenue_share: f64,
}

impl PeriodAssumption {
    pub fn new(rates: Vec<f64>, revenue_share: f64) -> Self {
        Self { rates, revenue_share }
    }

    /// A period that is not sold: all-zero rates and no revenue share
    pub fn inactive(period: PeriodType) -> Self {
        Self {
            rates: vec![0.0; period.checkpoints().len()],
            revenue_share: 0.0,
        }
    }

    /// All observations exactly zero means the plan is unused this year
    pub fn is_inactive(&self) -> bool {
        self.rates.iter().all(|&r| r == 0.0)
    }

    /// Boundary validation. Rates must line up with the checkpoints, lie in
    /// [0, 1], and be either all zero or all positive.
    pub fn validate(&self, year: i32, period: PeriodType) -> Result<(), AssumptionError> {
        let expected = period.checkpoints().len();
        if self.rates.len() != expected {
            return Err(AssumptionError::WrongRateCount {
                year,
                period,
                expected,
                got: self.rates.len(),
            });
        }

        for (index, &rate) in self.rates.iter().enumerate() {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(AssumptionError::RateOutOfRange { year, period, index, rate });
            }
        }

        if !self.is_inactive() && self.rates.iter().any(|&r| r == 0.0) {
            return Err(AssumptionError::PartialZeroRates { year, period });
        }

        if !self.revenue_share.is_finite() || !(0.0..=1.0).contains(&self.revenue_share) {
            return Err(AssumptionError::InvalidShare {
                year,
                period,
                share: self.revenue_share,
            });
        }

        Ok(())
    }
}

/// Assumptions for all four payment periods of one cohort year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearAssumptions {
    #[serde(default = "inactive_week")]
    pub week: PeriodAssumption,
    #[serde(default = "inactive_month")]
    pub month: PeriodAssumption,
    #[serde(default = "inactive_quarter")]
    pub quarter: PeriodAssumption,
    #[serde(default = "inactive_year")]
    pub year: PeriodAssumption,
}

fn inactive_week() -> PeriodAssumption { PeriodAssumption::inactive(PeriodType::Week) }
fn inactive_month() -> PeriodAssumption { PeriodAssumption::inactive(PeriodType::Month) }
fn inactive_quarter() -> PeriodAssumption { PeriodAssumption::inactive(PeriodType::Quarter) }
fn inactive_year() -> PeriodAssumption { PeriodAssumption::inactive(PeriodType::Year) }

impl YearAssumptions {
    /// Dashboard defaults: 20% weekly, 20% monthly, 20% quarterly, 40% yearly
    pub fn default_pricing() -> Self {
        Self {
            week: PeriodAssumption::new(vec![0.89, 0.76, 0.60], 0.2),
            month: PeriodAssumption::new(vec![0.85, 0.70, 0.55], 0.2),
            quarter: PeriodAssumption::new(vec![0.82, 0.65, 0.60], 0.2),
            year: PeriodAssumption::new(vec![0.80, 0.70, 0.60], 0.4),
        }
    }

    /// Every period inactive; callers switch on the plans they sell
    pub fn all_inactive() -> Self {
        Self {
            week: inactive_week(),
            month: inactive_month(),
            quarter: inactive_quarter(),
            year: inactive_year(),
        }
    }

    pub fn get(&self, period: PeriodType) -> &PeriodAssumption {
        match period {
            PeriodType::Week => &self.week,
            PeriodType::Month => &self.month,
            PeriodType::Quarter => &self.quarter,
            PeriodType::Year => &self.year,
        }
    }

    pub fn get_mut(&mut self, period: PeriodType) -> &mut PeriodAssumption {
        match period {
            PeriodType::Week => &mut self.week,
            PeriodType::Month => &mut self.month,
            PeriodType::Quarter => &mut self.quarter,
            PeriodType::Year => &mut self.year,
        }
    }

    /// Builder-style replacement of one period's assumption
    pub fn with(mut self, period: PeriodType, assumption: PeriodAssumption) -> Self {
        *self.get_mut(period) = assumption;
        self
    }

    pub fn share_sum(&self) -> f64 {
        PeriodType::ALL.iter().map(|&p| self.get(p).revenue_share).sum()
    }

    /// The share sum, when it is further than `SHARE_SUM_TOLERANCE` from 1
    pub fn share_sum_mismatch(&self) -> Option<f64> {
        let total = self.share_sum();
        ((total - 1.0).abs() > SHARE_SUM_TOLERANCE).then_some(total)
    }

    /// Validate every period. The share sum is not checked here.
    pub fn validate(&self, year: i32) -> Result<(), AssumptionError> {
        for period in PeriodType::ALL {
            self.get(period).validate(year, period)?;
        }
        Ok(())
    }
}

impl Default for YearAssumptions {
    fn default() -> Self {
        Self::default_pricing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pricing_is_valid() {
        let year = YearAssumptions::default_pricing();
        assert!(year.validate(2024).is_ok());
        assert!((year.share_sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inactive_period() {
        let inactive = PeriodAssumption::inactive(PeriodType::Quarter);
        assert!(inactive.is_inactive());
        assert_eq!(inactive.rates.len(), 3);
        assert!(inactive.validate(2024, PeriodType::Quarter).is_ok());
    }

    #[test]
    fn test_rejects_rate_above_one() {
        let bad = PeriodAssumption::new(vec![1.2, 0.7, 0.6], 0.5);
        let err = bad.validate(2024, PeriodType::Month).unwrap_err();
        assert!(matches!(err, AssumptionError::RateOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_rejects_wrong_rate_count() {
        let bad = PeriodAssumption::new(vec![0.8, 0.7], 0.5);
        let err = bad.validate(2024, PeriodType::Year).unwrap_err();
        assert!(matches!(err, AssumptionError::WrongRateCount { expected: 3, got: 2, .. }));
    }

    #[test]
    fn test_rejects_partial_zero_rates() {
        let bad = PeriodAssumption::new(vec![0.8, 0.0, 0.6], 0.5);
        let err = bad.validate(2024, PeriodType::Week).unwrap_err();
        assert!(matches!(err, AssumptionError::PartialZeroRates { .. }));
    }

    #[test]
    fn test_rejects_negative_share() {
        let bad = PeriodAssumption::new(vec![0.8, 0.7, 0.6], -0.1);
        assert!(bad.validate(2024, PeriodType::Week).is_err());
    }

    #[test]
    fn test_rejects_share_above_one() {
        let bad = PeriodAssumption::new(vec![0.8, 0.7, 0.6], 1.5);
        let err = bad.validate(2024, PeriodType::Year).unwrap_err();
        assert!(matches!(err, AssumptionError::InvalidShare { share, .. } if share == 1.5));
        assert!(PeriodAssumption::new(vec![0.8, 0.7, 0.6], 1.0).validate(2024, PeriodType::Year).is_ok());
    }

    #[test]
    fn test_share_sum_mismatch_is_not_an_error() {
        let year = YearAssumptions::all_inactive()
            .with(PeriodType::Year, PeriodAssumption::new(vec![0.8, 0.7, 0.6], 0.5));
        assert!(year.validate(2024).is_ok());
        assert_eq!(year.share_sum_mismatch(), Some(0.5));
        assert_eq!(YearAssumptions::default_pricing().share_sum_mismatch(), None);
    }
}

//! Subscription payment periods and their fixed observation checkpoints

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AssumptionError;

/// Week checkpoints: renewal observed at weeks 1, 3 and 7
const WEEK_CHECKPOINTS: [f64; 3] = [1.0, 3.0, 7.0];
/// Month checkpoints: months 1, 3 and 7
const MONTH_CHECKPOINTS: [f64; 3] = [1.0, 3.0, 7.0];
/// Quarter checkpoints: quarters 1, 3 and 4
const QUARTER_CHECKPOINTS: [f64; 3] = [1.0, 3.0, 4.0];
/// Year checkpoints: years 1, 2 and 3
const YEAR_CHECKPOINTS: [f64; 3] = [1.0, 2.0, 3.0];

/// Billing period of a subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Week,
    Month,
    Quarter,
    Year,
}

impl PeriodType {
    /// All period types in billing-cycle order
    pub const ALL: [PeriodType; 4] = [
        PeriodType::Week,
        PeriodType::Month,
        PeriodType::Quarter,
        PeriodType::Year,
    ];

    /// Billing cycle length in days. Renewals only happen on exact multiples.
    pub fn cycle_days(self) -> u32 {
        match self {
            PeriodType::Week => 7,
            PeriodType::Month => 30,
            PeriodType::Quarter => 90,
            PeriodType::Year => 365,
        }
    }

    /// Periods-since-activation at which a renewal rate is observed
    pub fn checkpoints(self) -> &'static [f64] {
        match self {
            PeriodType::Week => &WEEK_CHECKPOINTS,
            PeriodType::Month => &MONTH_CHECKPOINTS,
            PeriodType::Quarter => &QUARTER_CHECKPOINTS,
            PeriodType::Year => &YEAR_CHECKPOINTS,
        }
    }

    /// Convert a day offset into this period's units (fractional)
    pub fn periods_from_days(self, days: u32) -> f64 {
        days as f64 / self.cycle_days() as f64
    }

    /// True when `day` is a renewal (billing) day for this period
    pub fn is_renewal_day(self, day: u32) -> bool {
        day > 0 && day % self.cycle_days() == 0
    }

    /// Default number of periods shown when sampling a fitted curve
    /// (two years of weeks and months, five years of quarters, ten years)
    pub fn plot_horizon(self) -> f64 {
        match self {
            PeriodType::Week => 104.0,
            PeriodType::Month => 24.0,
            PeriodType::Quarter => 20.0,
            PeriodType::Year => 10.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PeriodType::Week => "week",
            PeriodType::Month => "month",
            PeriodType::Quarter => "quarter",
            PeriodType::Year => "year",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PeriodType {
    type Err = AssumptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" | "w" => Ok(PeriodType::Week),
            "month" | "monthly" | "m" => Ok(PeriodType::Month),
            "quarter" | "quarterly" | "q" => Ok(PeriodType::Quarter),
            "year" | "yearly" | "annual" | "y" => Ok(PeriodType::Year),
            other => Err(AssumptionError::UnknownPeriod(other.to_string())),
        }
    }
}

//! Retention assumptions: payment periods, observed renewal rates, and revenue shares

mod period;
mod retention;
pub mod loader;

pub use period::PeriodType;
pub use retention::{PeriodAssumption, YearAssumptions, SHARE_SUM_TOLERANCE};
pub use loader::{load_assumptions, load_assumptions_from_reader, load_assumptions_json, load_assumptions_path};

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::AssumptionError;

/// How per-year assumptions were entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterMode {
    /// One set of assumptions applied to every forecast year
    #[default]
    Uniform,
    /// A separate set of assumptions for each forecast year
    PerYear,
}

impl FromStr for ParameterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "uniform" | "same" => Ok(ParameterMode::Uniform),
            "per_year" | "yearly" => Ok(ParameterMode::PerYear),
            other => Err(format!("unknown parameter mode: {}", other)),
        }
    }
}

/// Calendar year -> assumptions for cohorts activated in that year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssumptionSet {
    years: BTreeMap<i32, YearAssumptions>,
}

impl AssumptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The same assumptions for every year in `start_year..=end_year`
    pub fn uniform(base: YearAssumptions, start_year: i32, end_year: i32) -> Self {
        let years = (start_year..=end_year).map(|y| (y, base.clone())).collect();
        Self { years }
    }

    pub fn insert(&mut self, year: i32, assumptions: YearAssumptions) {
        self.years.insert(year, assumptions);
    }

    pub fn get(&self, year: i32) -> Option<&YearAssumptions> {
        self.years.get(&year)
    }

    pub fn get_mut(&mut self, year: i32) -> Option<&mut YearAssumptions> {
        self.years.get_mut(&year)
    }

    /// Years in ascending order
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &YearAssumptions)> {
        self.years.iter().map(|(&y, a)| (y, a))
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Expand entered assumptions into a dense map over `start_year..=end_year`.
    ///
    /// Uniform mode copies the start year's entry (or the earliest entry when
    /// the start year is absent) to every year. Per-year mode requires an entry
    /// for each year.
    pub fn expand(
        &self,
        mode: ParameterMode,
        start_year: i32,
        end_year: i32,
    ) -> Result<Self, AssumptionError> {
        match mode {
            ParameterMode::Uniform => {
                let base = self
                    .get(start_year)
                    .or_else(|| self.years.values().next())
                    .ok_or(AssumptionError::Empty)?;
                Ok(Self::uniform(base.clone(), start_year, end_year))
            }
            ParameterMode::PerYear => {
                let mut dense = Self::new();
                for year in start_year..=end_year {
                    let entry = self.get(year).ok_or(AssumptionError::MissingYear(year))?;
                    dense.insert(year, entry.clone());
                }
                Ok(dense)
            }
        }
    }

    /// Years whose revenue shares do not sum to 1, with the sum
    pub fn share_sum_mismatches(&self) -> Vec<(i32, f64)> {
        self.years
            .iter()
            .filter_map(|(&year, a)| a.share_sum_mismatch().map(|total| (year, total)))
            .collect()
    }

    /// Log one warning per year whose shares do not sum to 1
    pub fn warn_share_sums(&self) {
        for (year, total) in self.share_sum_mismatches() {
            warn!("{}: revenue shares sum to {:.3}, expected 1.0", year, total);
        }
    }

    /// Validate every year's assumptions
    pub fn validate(&self) -> Result<(), AssumptionError> {
        if self.years.is_empty() {
            return Err(AssumptionError::Empty);
        }
        for (&year, assumptions) in &self.years {
            assumptions.validate(year)?;
        }
        Ok(())
    }
}

impl FromIterator<(i32, YearAssumptions)> for AssumptionSet {
    fn from_iter<I: IntoIterator<Item = (i32, YearAssumptions)>>(iter: I) -> Self {
        Self {
            years: iter.into_iter().collect(),
        }
    }
}

//! Assumption loaders
//!
//! CSV layout, one row per (year, period):
//!
//! ```text
//! Year,Period,Rate1,Rate2,Rate3,Share
//! 2024,week,0.89,0.76,0.60,0.2
//! 2024,year,0.80,0.70,0.60,0.4
//! ```
//!
//! Periods missing for a year are loaded as inactive. The JSON form is the
//! serialized `AssumptionSet`: `{"2024": {"week": {"rates": [...], "revenue_share": 0.2}, ...}}`.

use csv::Reader;
use log::debug;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{AssumptionSet, PeriodAssumption, PeriodType, YearAssumptions};
use crate::error::AssumptionError;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Period")]
    period: String,
    #[serde(rename = "Rate1")]
    rate_1: f64,
    #[serde(rename = "Rate2")]
    rate_2: f64,
    #[serde(rename = "Rate3")]
    rate_3: f64,
    #[serde(rename = "Share")]
    share: f64,
}

impl CsvRow {
    fn into_entry(self) -> Result<(i32, PeriodType, PeriodAssumption), AssumptionError> {
        let period: PeriodType = self.period.parse()?;
        let assumption = PeriodAssumption::new(vec![self.rate_1, self.rate_2, self.rate_3], self.share);
        Ok((self.year, period, assumption))
    }
}

/// Load assumptions from any CSV reader (file, string buffer, stdin)
pub fn load_assumptions_from_reader<R: Read>(reader: R) -> Result<AssumptionSet, AssumptionError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut set = AssumptionSet::new();
    let mut seen = HashSet::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let (year, period, assumption) = row.into_entry()?;
        if !seen.insert((year, period)) {
            return Err(AssumptionError::DuplicateEntry { year, period });
        }

        if set.get(year).is_none() {
            set.insert(year, YearAssumptions::all_inactive());
        }
        if let Some(entry) = set.get_mut(year) {
            *entry.get_mut(period) = assumption;
        }
    }

    if set.is_empty() {
        return Err(AssumptionError::Empty);
    }

    set.validate()?;
    debug!("loaded assumptions for {} years", set.len());
    Ok(set)
}

/// Load assumptions from a CSV file
pub fn load_assumptions<P: AsRef<Path>>(path: P) -> Result<AssumptionSet, AssumptionError> {
    let file = File::open(path)?;
    load_assumptions_from_reader(file)
}

/// Load assumptions from a JSON file or reader
pub fn load_assumptions_json<R: Read>(reader: R) -> Result<AssumptionSet, AssumptionError> {
    let set: AssumptionSet = serde_json::from_reader(reader)?;
    set.validate()?;
    debug!("loaded assumptions for {} years", set.len());
    Ok(set)
}

/// Load from a path, picking the format from the file extension
pub fn load_assumptions_path(path: &Path) -> Result<AssumptionSet, AssumptionError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        load_assumptions_json(File::open(path)?)
    } else {
        load_assumptions(path)
    }
}

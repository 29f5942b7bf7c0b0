//! Cumulative revenue-per-day (RPD) by calendar year
//!
//! RPD(Y) = revenue realized through Dec 31 of Y by every cohort activated in
//! or before Y, divided by users activated through Y. Realized revenue for a
//! cohort activated on `d` covers offsets `0..=(Dec 31 of Y - d)`.

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use super::table::RevenueTable;
use crate::error::AggregateError;

/// RPD result for one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRpd {
    pub year: i32,

    /// Users activated through Dec 31 of `year`
    pub cumulative_users: f64,

    /// Revenue realized through Dec 31 of `year`
    pub cumulative_revenue: f64,

    pub rpd: f64,

    /// Percent change in RPD from the prior year; `None` for the first year
    pub growth_rate: Option<f64>,
}

/// Growth in percent: (current / prior - 1) * 100
pub fn growth_rate(current: f64, prior: f64) -> f64 {
    (current / prior - 1.0) * 100.0
}

fn year_end(year: i32, start_year: i32, end_year: i32) -> Result<NaiveDate, AggregateError> {
    NaiveDate::from_ymd_opt(year, 12, 31).ok_or(AggregateError::InvalidYearRange {
        start: start_year,
        end: end_year,
    })
}

/// Roll the revenue table up into cumulative RPD for `start_year..=end_year`
pub fn aggregate(
    table: &RevenueTable,
    start_year: i32,
    end_year: i32,
) -> Result<Vec<YearlyRpd>, AggregateError> {
    if end_year < start_year {
        return Err(AggregateError::InvalidYearRange { start: start_year, end: end_year });
    }

    let year_ends = (start_year..=end_year)
        .map(|y| year_end(y, start_year, end_year))
        .collect::<Result<Vec<_>, _>>()?;

    let mut users = vec![0.0; year_ends.len()];
    let mut revenue = vec![0.0; year_ends.len()];

    for row in table.rows() {
        let first = (row.year() - start_year).max(0) as usize;
        if first >= year_ends.len() {
            continue;
        }

        // Walk the row once, extending the realized window year by year
        let mut realized = 0.0;
        let mut next_day = 0usize;
        for (idx, &dec_31) in year_ends.iter().enumerate().skip(first) {
            let last_day = (dec_31 - row.activation_date).num_days() as usize;
            realized += row.revenue_between(next_day, last_day);
            next_day = last_day + 1;
            users[idx] += row.activations;
            revenue[idx] += realized;
        }
    }

    let mut results: Vec<YearlyRpd> = Vec::with_capacity(year_ends.len());
    for (idx, year) in (start_year..=end_year).enumerate() {
        if users[idx] <= 0.0 {
            return Err(AggregateError::NoActivatedUsers { year });
        }
        let rpd = revenue[idx] / users[idx];

        let growth = match results.last() {
            Some(prior) if prior.rpd == 0.0 => {
                return Err(AggregateError::ZeroPriorRpd { year: prior.year });
            }
            Some(prior) => Some(growth_rate(rpd, prior.rpd)),
            None => None,
        };

        debug!("{}: users={:.0} revenue={:.2} rpd={:.4}", year, users[idx], revenue[idx], rpd);
        results.push(YearlyRpd {
            year,
            cumulative_users: users[idx],
            cumulative_revenue: revenue[idx],
            rpd,
            growth_rate: growth,
        });
    }

    Ok(results)
}

/// Aggregate over every calendar year the table's activation dates span
pub fn aggregate_table(table: &RevenueTable) -> Result<Vec<YearlyRpd>, AggregateError> {
    aggregate(table, table.start_date.year(), table.end_date.year())
}

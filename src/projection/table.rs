//! Daily revenue table: activation date x day offset

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Revenue for one activation-date cohort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortRow {
    pub activation_date: NaiveDate,

    /// Users activated on this date
    pub activations: f64,

    /// Revenue by day offset. Offsets past the table's end date are not
    /// stored, so `revenue.len() == (end_date - activation_date) + 1`.
    pub revenue: Vec<f64>,
}

impl CohortRow {
    pub fn year(&self) -> i32 {
        self.activation_date.year()
    }

    /// Revenue at `day`, `None` when the offset falls after the end date
    pub fn get(&self, day: usize) -> Option<f64> {
        self.revenue.get(day).copied()
    }

    /// Revenue at offsets `first_day..=last_day`, clamped to the stored row
    pub fn revenue_between(&self, first_day: usize, last_day: usize) -> f64 {
        let end = (last_day + 1).min(self.revenue.len());
        if first_day >= end {
            return 0.0;
        }
        self.revenue[first_day..end].iter().sum()
    }

    pub fn total_revenue(&self) -> f64 {
        self.revenue.iter().sum()
    }
}

/// Projected revenue for every cohort in `[start_date, end_date]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueTable {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    rows: Vec<CohortRow>,
}

impl RevenueTable {
    pub(crate) fn new(start_date: NaiveDate, end_date: NaiveDate, rows: Vec<CohortRow>) -> Self {
        Self { start_date, end_date, rows }
    }

    /// Number of day-offset columns: (end - start) + 1
    pub fn max_days(&self) -> usize {
        ((self.end_date - self.start_date).num_days() + 1) as usize
    }

    /// Cohort rows in activation-date order
    pub fn rows(&self) -> &[CohortRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, activation_date: NaiveDate) -> Option<&CohortRow> {
        if activation_date < self.start_date || activation_date > self.end_date {
            return None;
        }
        let idx = (activation_date - self.start_date).num_days() as usize;
        self.rows.get(idx)
    }

    /// Cell lookup. `None` when the cohort is outside the table or
    /// `activation_date + day` is after the end date.
    pub fn get(&self, activation_date: NaiveDate, day: usize) -> Option<f64> {
        self.row(activation_date)?.get(day)
    }

    /// Users activated on a date (0 outside the table)
    pub fn activations(&self, activation_date: NaiveDate) -> f64 {
        self.row(activation_date).map(|r| r.activations).unwrap_or(0.0)
    }

    /// Calendar date on which revenue at `(activation_date, day)` is realized
    pub fn realization_date(activation_date: NaiveDate, day: usize) -> NaiveDate {
        activation_date + Duration::days(day as i64)
    }

    pub fn total_revenue(&self) -> f64 {
        self.rows.iter().map(|r| r.total_revenue()).sum()
    }

    /// Calendar years spanned by activation dates
    pub fn years(&self) -> (i32, i32) {
        (self.start_date.year(), self.end_date.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn small_table() -> RevenueTable {
        let start = date(2024, 12, 30);
        let end = date(2025, 1, 1);
        let rows = vec![
            CohortRow { activation_date: start, activations: 10.0, revenue: vec![5.0, 1.0, 2.0] },
            CohortRow { activation_date: date(2024, 12, 31), activations: 10.0, revenue: vec![5.0, 1.0] },
            CohortRow { activation_date: end, activations: 10.0, revenue: vec![5.0] },
        ];
        RevenueTable::new(start, end, rows)
    }

    #[test]
    fn test_lookup_and_absent_cells() {
        let table = small_table();
        assert_eq!(table.max_days(), 3);
        assert_eq!(table.get(date(2024, 12, 30), 2), Some(2.0));
        assert_eq!(table.get(date(2024, 12, 31), 2), None);
        assert_eq!(table.get(date(2025, 1, 2), 0), None);
        assert_eq!(table.activations(date(2025, 1, 1)), 10.0);
        assert_eq!(table.years(), (2024, 2025));
    }

    #[test]
    fn test_revenue_between_clamps() {
        let table = small_table();
        let row = table.row(date(2024, 12, 30)).unwrap();
        assert_eq!(row.revenue_between(0, 0), 5.0);
        assert_eq!(row.revenue_between(0, 1), 6.0);
        assert_eq!(row.revenue_between(1, 10), 3.0);
        assert_eq!(row.revenue_between(3, 10), 0.0);
        assert!(!row.revenue_between(3, 10).is_sign_negative());
        assert_eq!(table.total_revenue(), 19.0);
    }

    #[test]
    fn test_realization_date() {
        assert_eq!(RevenueTable::realization_date(date(2024, 12, 31), 1), date(2025, 1, 1));
    }
}

//! CSV and console output for forecast results

use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

use crate::curve::CurveSeries;
use crate::projection::{RevenueTable, YearlyRpd};

/// One line of the yearly RPD export
#[derive(Debug, Serialize)]
struct YearlyRow {
    year: i32,
    /// 1 for the launch year
    product_year: usize,
    cumulative_users: f64,
    cumulative_revenue: f64,
    rpd: f64,
    growth_rate_pct: Option<f64>,
}

/// Write the daily revenue table: one row per cohort, one column per offset.
/// Offsets past the end date are left empty.
pub fn write_revenue_table<W: Write>(table: &RevenueTable, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let max_days = table.max_days();

    let mut header = Vec::with_capacity(max_days + 2);
    header.push("activation_date".to_string());
    header.push("activations".to_string());
    header.extend((0..max_days).map(|d| format!("day{}", d)));
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(max_days + 2);
        record.push(row.activation_date.to_string());
        record.push(row.activations.to_string());
        record.extend((0..max_days).map(|d| row.get(d).map(|v| v.to_string()).unwrap_or_default()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write yearly RPD results
pub fn write_yearly<W: Write>(yearly: &[YearlyRpd], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (i, y) in yearly.iter().enumerate() {
        wtr.serialize(YearlyRow {
            year: y.year,
            product_year: i + 1,
            cumulative_users: y.cumulative_users,
            cumulative_revenue: y.cumulative_revenue,
            rpd: y.rpd,
            growth_rate_pct: y.growth_rate,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write observed points and sampled fitted curves in long format
pub fn write_curves<W: Write>(series: &[CurveSeries], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["period", "year", "kind", "periods", "rate"])?;

    for s in series {
        let year = s.year.map(|y| y.to_string()).unwrap_or_default();
        let points = s
            .observed
            .iter()
            .map(|p| ("observed", p))
            .chain(s.fitted.iter().map(|p| ("fitted", p)));
        for (kind, &(x, rate)) in points {
            wtr.write_record([
                s.period.label(),
                year.as_str(),
                kind,
                x.to_string().as_str(),
                rate.to_string().as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Console table of yearly RPD and growth
pub fn format_yearly(yearly: &[YearlyRpd]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>6} {:>12} {:>12} {:>10}", "Year", "ProductYear", "RPD", "Growth");
    let _ = writeln!(out, "{}", "-".repeat(43));
    for (i, y) in yearly.iter().enumerate() {
        let growth = y
            .growth_rate
            .map(|g| format!("{:.2}%", g))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "{:>6} {:>12} {:>12.2} {:>10}", y.year, i + 1, y.rpd, growth);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{AssumptionSet, ParameterMode, YearAssumptions};
    use crate::curve::curve_series;
    use crate::projection::project;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_yearly() -> Vec<YearlyRpd> {
        vec![
            YearlyRpd { year: 2024, cumulative_users: 10.0, cumulative_revenue: 20.0, rpd: 2.0, growth_rate: None },
            YearlyRpd { year: 2025, cumulative_users: 20.0, cumulative_revenue: 50.0, rpd: 2.5, growth_rate: Some(25.0) },
        ]
    }

    #[test]
    fn test_revenue_table_csv_leaves_absent_cells_empty() {
        let set = AssumptionSet::uniform(YearAssumptions::default_pricing(), 2024, 2024);
        let table = project(1000.0, date(2024, 1, 1), date(2024, 1, 3), &set).unwrap();

        let mut buf = Vec::new();
        write_revenue_table(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "activation_date,activations,day0,day1,day2");
        assert_eq!(lines[1], "2024-01-01,1000,1000,0,0");
        assert_eq!(lines[3], "2024-01-03,1000,1000,,");
    }

    #[test]
    fn test_yearly_csv() {
        let mut buf = Vec::new();
        write_yearly(&sample_yearly(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "year,product_year,cumulative_users,cumulative_revenue,rpd,growth_rate_pct");
        assert_eq!(lines[1], "2024,1,10.0,20.0,2.0,");
        assert_eq!(lines[2], "2025,2,20.0,50.0,2.5,25.0");
    }

    #[test]
    fn test_curves_csv() {
        let set = AssumptionSet::uniform(YearAssumptions::default_pricing(), 2024, 2024);
        let series = curve_series(&set, ParameterMode::Uniform, 4).unwrap();

        let mut buf = Vec::new();
        write_curves(&series, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        // Header plus (3 observed + 4 fitted) per period
        assert_eq!(text.lines().count(), 1 + 4 * 7);
        assert!(text.lines().nth(1).unwrap().starts_with("week,,observed,1,0.89"));
    }

    #[test]
    fn test_format_yearly() {
        let text = format_yearly(&sample_yearly());
        assert!(text.contains("25.00%"));
        assert_eq!(text.lines().count(), 4);
    }
}

//! Forecast configuration
//!
//! Precedence, lowest first: built-in defaults, JSON config file, environment
//! (`RPD_LAUNCH_DATE`, `RPD_FORECAST_YEARS`, `RPD_DAILY_ACTIVATIONS`,
//! `RPD_BASE_REVENUE`, `RPD_MODE`), then command-line flags.

use chrono::{Datelike, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::assumptions::{AssumptionSet, ParameterMode};
use crate::error::ConfigError;
use crate::projection::{ProjectionConfig, DEFAULT_BASE_REVENUE, DEFAULT_DAILY_ACTIVATIONS};

/// Upper bound on the forecast horizon
pub const MAX_FORECAST_YEARS: u32 = 100;

/// Horizons past this many years build a revenue table of several hundred MB
const LARGE_HORIZON_YEARS: u32 = 30;

/// Inputs for one forecast run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// First activation date (product launch)
    #[serde(default = "default_launch_date")]
    pub launch_date: NaiveDate,

    /// Number of calendar years forecast, counting the launch year
    #[serde(default = "default_forecast_years")]
    pub forecast_years: u32,

    #[serde(default = "default_daily_activations")]
    pub daily_activations: f64,

    #[serde(default = "default_base_revenue")]
    pub base_revenue: f64,

    /// Whether `assumptions` holds one year for all, or one entry per year
    #[serde(default)]
    pub mode: ParameterMode,

    /// CSV or JSON file with retention assumptions
    #[serde(default)]
    pub assumptions_path: Option<PathBuf>,

    /// Inline assumptions, used when no path is given
    #[serde(default)]
    pub assumptions: Option<AssumptionSet>,
}

fn default_launch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}
fn default_forecast_years() -> u32 { 10 }
fn default_daily_activations() -> f64 { DEFAULT_DAILY_ACTIVATIONS }
fn default_base_revenue() -> f64 { DEFAULT_BASE_REVENUE }

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            launch_date: default_launch_date(),
            forecast_years: default_forecast_years(),
            daily_activations: default_daily_activations(),
            base_revenue: default_base_revenue(),
            mode: ParameterMode::default(),
            assumptions_path: None,
            assumptions: None,
        }
    }
}

impl ForecastConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_reader(File::open(path)?)
    }

    /// Apply `RPD_*` environment overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RPD_LAUNCH_DATE") {
            self.launch_date = parse_env("RPD_LAUNCH_DATE", &v)?;
        }
        if let Some(v) = lookup("RPD_FORECAST_YEARS") {
            self.forecast_years = parse_env("RPD_FORECAST_YEARS", &v)?;
        }
        if let Some(v) = lookup("RPD_DAILY_ACTIVATIONS") {
            self.daily_activations = parse_env("RPD_DAILY_ACTIVATIONS", &v)?;
        }
        if let Some(v) = lookup("RPD_BASE_REVENUE") {
            self.base_revenue = parse_env("RPD_BASE_REVENUE", &v)?;
        }
        if let Some(v) = lookup("RPD_MODE") {
            self.mode = v
                .parse()
                .map_err(|_| ConfigError::Env { var: "RPD_MODE", value: v.clone() })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forecast_years == 0 || self.forecast_years > MAX_FORECAST_YEARS {
            return Err(ConfigError::ForecastYears {
                got: self.forecast_years,
                max: MAX_FORECAST_YEARS,
            });
        }
        if !self.daily_activations.is_finite() || self.daily_activations < 0.0 {
            return Err(ConfigError::NonNegative {
                field: "daily_activations",
                value: self.daily_activations,
            });
        }
        if !self.base_revenue.is_finite() || self.base_revenue < 0.0 {
            return Err(ConfigError::NonNegative {
                field: "base_revenue",
                value: self.base_revenue,
            });
        }
        self.end_date()?;

        if self.forecast_years > LARGE_HORIZON_YEARS {
            warn!(
                "{} forecast years: the daily revenue table grows with the square of the horizon",
                self.forecast_years
            );
        }
        Ok(())
    }

    pub fn start_year(&self) -> i32 {
        self.launch_date.year()
    }

    pub fn end_year(&self) -> i32 {
        self.start_year() + self.forecast_years as i32 - 1
    }

    pub fn start_date(&self) -> NaiveDate {
        self.launch_date
    }

    /// Dec 31 of the last forecast year
    pub fn end_date(&self) -> Result<NaiveDate, ConfigError> {
        let year = self.end_year();
        NaiveDate::from_ymd_opt(year, 12, 31).ok_or(ConfigError::DateOutOfRange(year))
    }

    pub fn projection_config(&self) -> ProjectionConfig {
        ProjectionConfig {
            daily_activations: self.daily_activations,
            base_revenue: self.base_revenue,
        }
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ForecastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.start_year(), 2024);
        assert_eq!(config.end_year(), 2033);
        assert_eq!(config.end_date().unwrap(), NaiveDate::from_ymd_opt(2033, 12, 31).unwrap());
        assert_eq!(config.mode, ParameterMode::Uniform);
    }

    #[test]
    fn test_json_fills_defaults() {
        let json = r#"{ "launch_date": "2023-06-15", "forecast_years": 3, "mode": "per_year" }"#;
        let config = ForecastConfig::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(config.launch_date, NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
        assert_eq!(config.end_year(), 2025);
        assert_eq!(config.mode, ParameterMode::PerYear);
        assert_eq!(config.daily_activations, DEFAULT_DAILY_ACTIVATIONS);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RPD_FORECAST_YEARS", "2"),
            ("RPD_BASE_REVENUE", "500"),
            ("RPD_MODE", "per-year"),
        ]
        .into_iter()
        .collect();

        let mut config = ForecastConfig::default();
        config
            .apply_env_with(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.forecast_years, 2);
        assert_eq!(config.base_revenue, 500.0);
        assert_eq!(config.mode, ParameterMode::PerYear);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = ForecastConfig::default();
        let err = config
            .apply_env_with(|k| (k == "RPD_FORECAST_YEARS").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "RPD_FORECAST_YEARS", .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ForecastConfig { forecast_years: 0, ..Default::default() };
        assert!(config.validate().is_err());

        config.forecast_years = 5;
        config.daily_activations = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonNegative { field: "daily_activations", .. })
        ));
    }
}

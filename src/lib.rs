//! RPD Forecast - subscription revenue-per-day projection from sparse renewal observations
//!
//! This library provides:
//! - Power-law retention curve fitting from a few observed renewal rates
//! - Daily revenue projection across overlapping activation cohorts
//! - Cumulative yearly RPD with year-over-year growth
//! - Assumption loading (CSV/JSON), configuration, and CSV reporting

pub mod assumptions;
pub mod config;
pub mod curve;
pub mod error;
pub mod projection;
pub mod report;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{AssumptionSet, ParameterMode, PeriodAssumption, PeriodType, YearAssumptions};
pub use config::ForecastConfig;
pub use curve::{evaluate, fit, RetentionCurve};
pub use error::RpdError;
pub use projection::{aggregate, project, RevenueProjector, RevenueTable, YearlyRpd};
pub use scenario::{Forecast, ForecastRunner};

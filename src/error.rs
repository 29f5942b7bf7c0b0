//! Error types for fitting, projection, and aggregation

use chrono::NaiveDate;
use thiserror::Error;

use crate::assumptions::PeriodType;

/// Failure to fit a retention curve to observed renewal rates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("checkpoint/rate length mismatch: {checkpoints} checkpoints, {rates} rates")]
    LengthMismatch { checkpoints: usize, rates: usize },
    #[error("need at least 2 observations to fit a curve, got {0}")]
    TooFewPoints(usize),
    #[error("checkpoint {index} must be positive, got {value}")]
    NonPositiveCheckpoint { index: usize, value: f64 },
    #[error("checkpoints must be strictly increasing (index {index})")]
    NonIncreasingCheckpoints { index: usize },
    #[error("rate {index} must be in (0, 1] unless all rates are 0, got {rate}")]
    RateOutOfRange { index: usize, rate: f64 },
    #[error("fit did not converge: {0}")]
    NotConverged(String),
    #[error("fitted curve does not decay (exponent {exponent:.6} > 0)")]
    NonDecaying { exponent: f64 },
}

/// Invalid retention assumptions, rejected before any fitting happens
#[derive(Error, Debug)]
pub enum AssumptionError {
    #[error("{year} {period}: expected {expected} rates, got {got}")]
    WrongRateCount { year: i32, period: PeriodType, expected: usize, got: usize },
    #[error("{year} {period}: rate {index} out of [0, 1]: {rate}")]
    RateOutOfRange { year: i32, period: PeriodType, index: usize, rate: f64 },
    #[error("{year} {period}: rates must be all zero or all positive")]
    PartialZeroRates { year: i32, period: PeriodType },
    #[error("{year} {period}: revenue share out of [0, 1]: {share}")]
    InvalidShare { year: i32, period: PeriodType, share: f64 },
    #[error("{year} {period}: listed more than once")]
    DuplicateEntry { year: i32, period: PeriodType },
    #[error("unknown period type: {0}")]
    UnknownPeriod(String),
    #[error("no assumptions for year {0}")]
    MissingYear(i32),
    #[error("no assumptions supplied")]
    Empty,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while building the daily revenue table
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("no assumptions for activation year {0}")]
    MissingYear(i32),
    #[error("fit failed for {year} {period}: {source}")]
    Fit { year: i32, period: PeriodType, source: FitError },
}

/// Failure while rolling the revenue table up into yearly RPD
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("end year {end} is before start year {start}")]
    InvalidYearRange { start: i32, end: i32 },
    #[error("no users activated through {year}")]
    NoActivatedUsers { year: i32 },
    #[error("RPD for {year} is zero, growth into the following year is undefined")]
    ZeroPriorRpd { year: i32 },
}

/// Invalid forecast configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("forecast_years must be between 1 and {max}, got {got}")]
    ForecastYears { got: u32, max: u32 },
    #[error("{field} must be a non-negative number, got {value}")]
    NonNegative { field: &'static str, value: f64 },
    #[error("forecast end year {0} is outside the supported date range")]
    DateOutOfRange(i32),
    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any error raised by a forecast run
#[derive(Error, Debug)]
pub enum RpdError {
    #[error(transparent)]
    Fit(#[from] FitError),
    #[error(transparent)]
    Assumption(#[from] AssumptionError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

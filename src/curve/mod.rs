//! Retention curve fitting and sampling

mod fit;
mod series;

pub use fit::{evaluate, fit, fit_period, RetentionCurve};
pub use series::{curve_series, sample_curve, CurveSeries, DEFAULT_SAMPLES};

//! Power-law retention curve fitted in log-log space
//!
//! Model: rate(p) = a * p^b, i.e. ln(rate) = ln(a) + b*ln(p). The model is
//! linear in (ln a, b), so the least-squares solution is the ordinary
//! regression of ln(rate) on ln(p).

use serde::{Deserialize, Serialize};

use crate::assumptions::PeriodType;
use crate::error::FitError;

/// Fitted exponents above this are treated as growth, not decay.
/// Leaves room for rounding on perfectly flat observations.
const DECAY_TOLERANCE: f64 = 1e-9;

/// Fitted decay curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetentionCurve {
    /// Scale (rate at period 1)
    pub a: f64,
    /// Exponent, negative for decaying retention
    pub b: f64,
}

impl RetentionCurve {
    /// Sentinel for a period type that is not sold: evaluates to 0 everywhere
    pub const INACTIVE: RetentionCurve = RetentionCurve { a: 0.0, b: 0.0 };

    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    pub fn is_inactive(&self) -> bool {
        self.a == 0.0 && self.b == 0.0
    }

    /// Renewal rate `periods` billing periods after activation
    pub fn evaluate(&self, periods: f64) -> f64 {
        evaluate(periods, self.a, self.b)
    }

    /// Renewal rate on day offset `day` for a plan billed every `period`
    pub fn rate_at_day(&self, day: u32, period: PeriodType) -> f64 {
        self.evaluate(period.periods_from_days(day))
    }
}

/// Evaluate `a * p^b` in log space. Returns 0 for the inactive sentinel.
pub fn evaluate(periods: f64, a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    (a.ln() + b * periods.ln()).exp()
}

/// Fit a retention curve to observed rates at the given checkpoints.
///
/// Checkpoints are checked first; all-zero rates then return
/// `RetentionCurve::INACTIVE` without fitting.
pub fn fit(checkpoints: &[f64], rates: &[f64]) -> Result<RetentionCurve, FitError> {
    if checkpoints.len() != rates.len() {
        return Err(FitError::LengthMismatch {
            checkpoints: checkpoints.len(),
            rates: rates.len(),
        });
    }

    if checkpoints.len() < 2 {
        return Err(FitError::TooFewPoints(checkpoints.len()));
    }

    for (index, &value) in checkpoints.iter().enumerate() {
        if !(value > 0.0) || !value.is_finite() {
            return Err(FitError::NonPositiveCheckpoint { index, value });
        }
        if index > 0 && value <= checkpoints[index - 1] {
            return Err(FitError::NonIncreasingCheckpoints { index });
        }
    }

    if rates.iter().all(|&r| r == 0.0) {
        return Ok(RetentionCurve::INACTIVE);
    }

    for (index, &rate) in rates.iter().enumerate() {
        if !(rate > 0.0) || rate > 1.0 {
            return Err(FitError::RateOutOfRange { index, rate });
        }
    }

    let n = checkpoints.len() as f64;
    let xs: Vec<f64> = checkpoints.iter().map(|p| p.ln()).collect();
    let ys: Vec<f64> = rates.iter().map(|r| r.ln()).collect();

    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (sxx, sxy) = xs
        .iter()
        .zip(&ys)
        .fold((0.0, 0.0), |(sxx, sxy), (&x, &y)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (y - mean_y))
        });

    if !(sxx > 0.0) {
        return Err(FitError::NotConverged("checkpoints have no spread in log space".to_string()));
    }

    let b = sxy / sxx;
    let ln_a = mean_y - b * mean_x;
    let a = ln_a.exp();

    if !a.is_finite() || !b.is_finite() || a <= 0.0 {
        return Err(FitError::NotConverged(format!("non-finite parameters a={}, b={}", a, b)));
    }

    if b > DECAY_TOLERANCE {
        return Err(FitError::NonDecaying { exponent: b });
    }

    Ok(RetentionCurve { a, b })
}

/// Fit a curve to rates observed at `period`'s fixed checkpoints
pub fn fit_period(period: PeriodType, rates: &[f64]) -> Result<RetentionCurve, FitError> {
    fit(period.checkpoints(), rates)
}

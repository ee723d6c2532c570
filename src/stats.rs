//! Descriptive statistics over a flat series.
//!
//! Mean, median, min and max are total: they return 0.0 for an empty input.
//! Standard deviation needs enough samples for the chosen estimator and says so
//! with [`StatsError::InsufficientData`] rather than returning a number.
//!
//! NaN values are not filtered here. Callers holding aligned series should pass
//! them through [`finite`] first.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("standard deviation needs at least {needed} values, got {got}")]
    InsufficientData { needed: usize, got: usize },
}

/// Denominator used for the variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variance {
    /// `n - 1`; the default.
    #[default]
    Sample,
    /// `n`.
    Population,
}

impl Variance {
    fn min_len(self) -> usize {
        match self {
            Variance::Sample => 2,
            Variance::Population => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// None when there are too few values for the chosen estimator.
    pub std_dev: Option<f64>,
}

pub fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn min(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(|acc, v| if v < acc { v } else { acc })
        .unwrap_or(0.0)
}

pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(|acc, v| if v > acc { v } else { acc })
        .unwrap_or(0.0)
}

pub fn std_dev(values: &[f64], variance: Variance) -> Result<f64, StatsError> {
    let n = values.len();
    if n < variance.min_len() {
        return Err(StatsError::InsufficientData {
            needed: variance.min_len(),
            got: n,
        });
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    let denom = match variance {
        Variance::Sample => (n - 1) as f64,
        Variance::Population => n as f64,
    };
    Ok((sum_sq / denom).sqrt())
}

/// All five statistics at once. Only the deviation can be missing; call
/// [`std_dev`] directly to learn why.
pub fn summarize(values: &[f64], variance: Variance) -> Summary {
    Summary {
        count: values.len(),
        mean: mean(values),
        median: median(values),
        min: min(values),
        max: max(values),
        std_dev: std_dev(values, variance).ok(),
    }
}

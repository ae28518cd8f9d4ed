//! Mean and confidence interval half-widths.
//!
//! Two estimators are available and a run uses exactly one of them:
//!
//! - [`CiMethod::Normal`]: `z(1 - α/2) * s / sqrt(n)`. At 95% this is the
//!   familiar `1.96 * s / sqrt(n)`.
//! - [`CiMethod::StudentT`]: `t(1 - α/2, n - 1) * s / sqrt(n)`, wider for
//!   small samples.
//!
//! With one sample the standard error is undefined, so the half-width is NaN
//! and [`ConfidenceInterval::is_degenerate`] returns `true`.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use std::fmt;

use crate::error::{AnalysisError, Result};

/// Default confidence level
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Interval estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CiMethod {
    /// Normal approximation
    #[default]
    Normal,
    /// Student-t with `n - 1` degrees of freedom
    #[serde(alias = "t", alias = "student_t")]
    StudentT,
}

impl fmt::Display for CiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CiMethod::Normal => f.write_str("normal"),
            CiMethod::StudentT => f.write_str("student-t"),
        }
    }
}

impl std::str::FromStr for CiMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "z" => Ok(CiMethod::Normal),
            "student-t" | "student_t" | "t" => Ok(CiMethod::StudentT),
            _ => Err(AnalysisError::InvalidSelector {
                kind: "ci method",
                value: s.to_string(),
                expected: "normal, student-t",
            }),
        }
    }
}

/// Mean with the half-width of its confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    /// NaN when `count <= 1`
    pub half_width: f64,
    /// Sample standard deviation (`n - 1` denominator), NaN when `count <= 1`
    pub std_dev: f64,
    pub count: usize,
    pub level: f64,
    pub method: CiMethod,
}

impl ConfidenceInterval {
    /// `true` when the interval could not be estimated
    pub fn is_degenerate(&self) -> bool {
        self.half_width.is_nan()
    }

    pub fn lower(&self) -> f64 {
        self.mean - self.half_width
    }

    pub fn upper(&self) -> f64 {
        self.mean + self.half_width
    }

    /// Express the interval in another unit by scaling mean, half-width and
    /// standard deviation together.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            mean: self.mean * factor,
            half_width: self.half_width * factor,
            std_dev: self.std_dev * factor,
            ..*self
        }
    }
}

/// Validate a confidence level
pub fn check_level(level: f64) -> Result<f64> {
    if level.is_finite() && level > 0.0 && level < 1.0 {
        Ok(level)
    } else {
        Err(AnalysisError::InvalidConfidenceLevel(level))
    }
}

/// Two-sided critical value for `level`.
///
/// `count` only matters for the Student-t method.
pub fn critical_value(level: f64, method: CiMethod, count: usize) -> Result<f64> {
    let level = check_level(level)?;
    let p = (1.0 + level) / 2.0;
    match method {
        CiMethod::Normal => {
            let normal = Normal::new(0.0, 1.0)
                .map_err(|_| AnalysisError::InvalidConfidenceLevel(level))?;
            Ok(normal.inverse_cdf(p))
        }
        CiMethod::StudentT => {
            if count < 2 {
                return Ok(f64::NAN);
            }
            let t = StudentsT::new(0.0, 1.0, (count - 1) as f64)
                .map_err(|_| AnalysisError::InvalidConfidenceLevel(level))?;
            Ok(t.inverse_cdf(p))
        }
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    if values.iter().all(|&x| x == first) {
        // Constant series: avoid rounding in the sum
        return Some(first);
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Compute the mean and confidence half-width of `values`.
///
/// # Errors
///
/// - [`AnalysisError::EmptyInput`] when `values` is empty
/// - [`AnalysisError::InvalidConfidenceLevel`] when `level` is outside (0, 1)
///
/// # Examples
///
/// ```
/// use hwbench_core::stats::{mean_and_ci, CiMethod};
///
/// let ci = mean_and_ci(&[10.0, 12.0, 11.0, 13.0, 9.0, 10.0], 0.95, CiMethod::Normal).unwrap();
/// assert!((ci.mean - 10.8333).abs() < 1e-3);
/// assert!((ci.half_width - 1.178).abs() < 1e-3);
/// ```
pub fn mean_and_ci(values: &[f64], level: f64, method: CiMethod) -> Result<ConfidenceInterval> {
    let level = check_level(level)?;
    let count = values.len();
    let Some(mean) = mean(values) else {
        return Err(AnalysisError::EmptyInput {
            metric: "series".to_string(),
        });
    };

    if count == 1 {
        return Ok(ConfidenceInterval {
            mean,
            half_width: f64::NAN,
            std_dev: f64::NAN,
            count,
            level,
            method,
        });
    }

    let variance =
        values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
    let std_dev = variance.sqrt();
    let std_err = std_dev / (count as f64).sqrt();
    let half_width = critical_value(level, method, count)? * std_err;

    Ok(ConfidenceInterval {
        mean,
        half_width,
        std_dev,
        count,
        level,
        method,
    })
}

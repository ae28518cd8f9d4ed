//! Percentiles and descriptive summaries of a measurement series.

use serde::Serialize;

/// Percentile of `samples` using linear interpolation between nearest ranks.
///
/// Returns `None` if `samples` is empty or `p` is outside `0.0..=100.0`.
///
/// # Examples
///
/// ```
/// use hwbench_core::stats::percentile;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(percentile(&data, 50.0), Some(3.0));
/// ```
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    if samples.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(percentile_sorted(&sorted, p))
}

fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let fraction = rank - lower as f64;
        sorted[lower] + fraction * (sorted[upper] - sorted[lower])
    }
}

/// Spread of a series, reported next to the confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleSummary {
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
    pub count: usize,
}

impl SampleSummary {
    /// Returns `None` for an empty series.
    ///
    /// ```
    /// use hwbench_core::stats::SampleSummary;
    ///
    /// let summary = SampleSummary::from_samples(&[3.0, 1.0, 2.0]).unwrap();
    /// assert_eq!(summary.min, 1.0);
    /// assert_eq!(summary.p50, 2.0);
    /// assert_eq!(summary.max, 3.0);
    /// ```
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(SampleSummary {
            min: sorted[0],
            p25: percentile_sorted(&sorted, 25.0),
            p50: percentile_sorted(&sorted, 50.0),
            p75: percentile_sorted(&sorted, 75.0),
            max: sorted[sorted.len() - 1],
            count: sorted.len(),
        })
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            p25: self.p25 * factor,
            p50: self.p50 * factor,
            p75: self.p75 * factor,
            max: self.max * factor,
            count: self.count,
        }
    }
}

/// Coefficient of variation (`std_dev / mean`), infinite for a zero mean
pub fn coefficient_of_variation(mean: f64, std_dev: f64) -> f64 {
    if mean == 0.0 {
        f64::INFINITY
    } else {
        std_dev / mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_empty_samples() {
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_percentile_single_sample() {
        let samples = vec![42.0];
        assert_eq!(percentile(&samples, 0.0), Some(42.0));
        assert_eq!(percentile(&samples, 100.0), Some(42.0));
    }

    #[test]
    fn test_percentile_invalid_p() {
        let samples = vec![1.0, 2.0, 3.0];
        assert_eq!(percentile(&samples, -1.0), None);
        assert_eq!(percentile(&samples, 101.0), None);
    }

    #[test]
    fn test_percentile_with_interpolation() {
        let samples: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!((percentile(&samples, 25.0).unwrap() - 3.25).abs() < 1e-10);
        assert!((percentile(&samples, 75.0).unwrap() - 7.75).abs() < 1e-10);
    }

    #[test]
    fn test_percentile_unsorted_samples() {
        assert_eq!(percentile(&[5.0, 1.0, 3.0, 2.0, 4.0], 50.0), Some(3.0));
    }

    #[test]
    fn test_summary_empty() {
        assert!(SampleSummary::from_samples(&[]).is_none());
    }

    #[test]
    fn test_summary_basic() {
        let samples = vec![10.0, 12.0, 11.0, 13.0, 9.0, 10.0];
        let summary = SampleSummary::from_samples(&samples).unwrap();
        assert_eq!(summary.count, 6);
        assert_eq!(summary.min, 9.0);
        assert_eq!(summary.max, 13.0);
        assert_eq!(summary.p50, 10.5);
    }

    #[test]
    fn test_summary_scaled() {
        let summary = SampleSummary::from_samples(&[0.01, 0.02]).unwrap().scaled(1000.0);
        assert!((summary.min - 10.0).abs() < 1e-9);
        assert!((summary.max - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(coefficient_of_variation(0.0, 3.0), f64::INFINITY);
        assert!((coefficient_of_variation(10.0, 1.0) - 0.1).abs() < 1e-12);
    }
}

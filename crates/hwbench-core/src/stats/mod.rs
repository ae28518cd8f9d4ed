//! Statistical aggregation of measurement series
//!
//! # Examples
//!
//! ```
//! use hwbench_core::stats::{mean_and_ci, CiMethod, SampleSummary};
//!
//! let samples = vec![10.0, 12.0, 11.0, 13.0, 9.0, 10.0];
//!
//! let ci = mean_and_ci(&samples, 0.95, CiMethod::Normal).unwrap();
//! let summary = SampleSummary::from_samples(&samples).unwrap();
//! println!("{:.2} ± {:.2} (median {})", ci.mean, ci.half_width, summary.p50);
//! ```

pub mod confidence;
pub mod percentiles;

pub use confidence::{
    check_level, critical_value, mean, mean_and_ci, CiMethod, ConfidenceInterval,
    DEFAULT_CONFIDENCE_LEVEL,
};
pub use percentiles::{coefficient_of_variation, percentile, SampleSummary};

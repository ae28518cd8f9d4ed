//! Hardware vs software cryptography benchmark analysis
//!
//! This crate turns raw microcontroller benchmark captures into comparable
//! statistics: one CSV file per (operation, implementation) with time, current
//! and power columns, reduced to a mean and a confidence interval per metric.
//!
//! # Features
//!
//! - **Discovery**: Per-platform measurement directories, classified by file name
//! - **Ingestion**: Header-driven column recognition with declared time units
//! - **Statistics**: Mean with normal or Student-t confidence intervals
//! - **Results**: Immutable operation → class → metric table, incomplete pairs flagged
//! - **Output**: Console, JSON and Markdown reports plus SVG bar charts
//!
//! # Example
//!
//! ```no_run
//! use hwbench_core::{Config, pipeline::run_analysis, reporter::{Reporter, OutputFormat}};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_file("hwbench.toml")?;
//! let report = run_analysis(&config)?;
//!
//! Reporter::new(OutputFormat::Console).report(&report)?;
//! Reporter::new(OutputFormat::Json).write_to_file(&report, "results.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [analysis]
//! platform = "nrf"
//! confidence_level = 0.95
//! ci_method = "normal"
//! measurements_dir = "measurements"
//! metrics = ["time", "current", "power"]
//!
//! [[rules]]
//! tag = "cracen"
//! class = "hardware"
//!
//! [[rules]]
//! tag = "rustcrypto"
//! class = "software"
//!
//! [charts]
//! output_dir = "plots"
//! log_scale_time = true
//! ```

pub mod chart;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod flash;
pub mod ingest;
pub mod pipeline;
pub mod reporter;
pub mod results;
pub mod stats;
pub mod types;

// Re-export main types for convenience
pub use classify::{Classification, ClassificationRule, Classifier};
pub use config::{Config, ParsePolicy};
pub use error::{AnalysisError, Result};
pub use flash::FlashTable;
pub use pipeline::{run_analysis, AnalysisReport};
pub use reporter::{OutputFormat, Reporter};
pub use results::{AggregateResult, AggregationSettings, Comparison, ResultTable};
pub use stats::{CiMethod, ConfidenceInterval};
pub use types::{ImplementationClass, Metric, Platform, Unit};

//! Analysis orchestration
//!
//! Runs the stages strictly in sequence:
//!
//! ```text
//! discover ──▶ ingest ──▶ aggregate ──▶ ResultTable
//!  (classify)   (per file)  (pure pass)   (+ incomplete list)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hwbench_core::{Config, Platform, pipeline::run_analysis};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::for_platform(Platform::Nrf);
//! let report = run_analysis(&config)?;
//!
//! for row in report.results.comparisons(hwbench_core::Metric::Time) {
//!     println!("{}: complete={}", row.operation, row.is_complete());
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::{Config, ParsePolicy};
use crate::discovery::{discover, list_csv_files, platform_dir, MeasurementFile};
use crate::error::AnalysisError;
use crate::ingest::SampleTable;
use crate::results::{AggregationSettings, Dataset, IncompleteComparison, ResultTable};
use crate::stats::{self, CiMethod};
use crate::types::{ImplementationClass, Metric, Platform, Unit};

/// Output of a complete analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub platform: Platform,
    /// RFC 3339 timestamp of the run
    pub started_at: String,
    pub duration_ms: u64,
    pub config_summary: ConfigSummary,
    /// Files that contributed results
    pub files: Vec<MeasurementFile>,
    /// Files dropped under the `skip` parse policy
    pub skipped: Vec<SkippedFile>,
    pub results: ResultTable,
    pub incomplete: Vec<IncompleteComparison>,
}

/// Parameters the results were computed with
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub implementation: Option<ImplementationClass>,
    pub confidence_level: f64,
    pub ci_method: CiMethod,
    pub time_unit: Unit,
    pub metrics: Vec<Metric>,
    pub measurements_dir: PathBuf,
}

/// A file that failed to parse but did not abort the run
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Discover, ingest and aggregate the measurements of the configured platform.
///
/// # Errors
///
/// Fails when no platform is selected, the platform directory is missing, no
/// file classifies, or a file fails to parse under the `abort` policy. The
/// underlying [`AnalysisError`] can be recovered with `downcast_ref`.
#[instrument(skip(config), fields(platform = ?config.analysis.platform))]
pub fn run_analysis(config: &Config) -> Result<AnalysisReport> {
    let start_time = Instant::now();
    let started_at = chrono::Utc::now().to_rfc3339();
    let platform = config.require_platform()?;
    let analysis = &config.analysis;
    let settings = config.aggregation_settings();

    let files = discover(
        &analysis.measurements_dir,
        platform,
        &config.classifier(),
        analysis.implementation,
    )?;

    if files.is_empty() {
        return Err(AnalysisError::NoMatchingFiles {
            platform: match analysis.implementation {
                Some(class) => format!("{} ({})", platform, class),
                None => platform.to_string(),
            },
            dir: platform_dir(&analysis.measurements_dir, platform),
        }
        .into());
    }

    info!("Analyzing {} measurement files for {}", files.len(), platform);

    let (datasets, skipped) = ingest_all(files, &settings, analysis.on_parse_error)?;
    let results = ResultTable::build(&datasets, &settings)
        .context("Failed to aggregate measurements")?;

    let incomplete = results.incomplete();
    for gap in &incomplete {
        warn!(
            "'{}' has {} results but no {} results; comparison skipped",
            gap.operation, gap.present, gap.missing
        );
    }

    let report = AnalysisReport {
        platform,
        started_at,
        duration_ms: start_time.elapsed().as_millis() as u64,
        config_summary: ConfigSummary {
            implementation: analysis.implementation,
            confidence_level: settings.confidence_level,
            ci_method: settings.method,
            time_unit: settings.time_unit,
            metrics: settings.metrics.clone(),
            measurements_dir: analysis.measurements_dir.clone(),
        },
        files: datasets.into_iter().map(|d| d.file).collect(),
        skipped,
        results,
        incomplete,
    };

    info!(
        "Aggregated {} operations ({} incomplete, {} files skipped) in {}ms",
        report.results.len(),
        report.incomplete.len(),
        report.skipped.len(),
        report.duration_ms
    );

    Ok(report)
}

/// Load every file, applying the parse policy to per-file failures
fn ingest_all(
    files: Vec<MeasurementFile>,
    settings: &AggregationSettings,
    policy: ParsePolicy,
) -> Result<(Vec<Dataset>, Vec<SkippedFile>)> {
    let mut datasets = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for file in files {
        let loaded = SampleTable::load(&file.path).and_then(|table| {
            // Requested metrics must all be present
            for &metric in &settings.metrics {
                table.require(metric)?;
            }
            Ok(table)
        });

        match loaded {
            Ok(table) => datasets.push(Dataset { file, table }),
            Err(e) if policy == ParsePolicy::Skip && e.is_file_local() => {
                warn!("Skipping {}: {}", file.path.display(), e);
                skipped.push(SkippedFile {
                    path: file.path,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok((datasets, skipped))
}

/// Mean time of one file, regardless of classification
#[derive(Debug, Clone, Serialize)]
pub struct FileAverage {
    pub platform: Platform,
    pub path: PathBuf,
    pub mean: f64,
    pub unit: Unit,
    pub samples: usize,
}

/// Mean time of every CSV file under each platform directory.
///
/// Platforms without a directory are skipped with a warning.
pub fn file_averages(root: &Path, platforms: &[Platform], unit: Unit) -> Result<Vec<FileAverage>> {
    let mut averages = Vec::new();

    for &platform in platforms {
        let dir = platform_dir(root, platform);
        let files = match list_csv_files(&dir) {
            Ok(files) => files,
            Err(AnalysisError::MissingDirectory(dir)) => {
                warn!("No measurements for {} ({})", platform, dir.display());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        for path in files {
            let table = SampleTable::load(&path)?;
            let series = table.require(Metric::Time)?;
            let values = series
                .values_in(unit)
                .with_context(|| format!("Cannot express {} in {}", series.header, unit))?;
            let Some(mean) = stats::mean(&values) else {
                warn!("{} has no samples", path.display());
                continue;
            };
            averages.push(FileAverage {
                platform,
                mean,
                unit,
                samples: values.len(),
                path,
            });
        }
    }

    Ok(averages)
}

/// Small in-memory report for presentation tests
#[cfg(test)]
pub(crate) fn sample_report() -> AnalysisReport {
    let settings = AggregationSettings {
        metrics: vec![Metric::Time],
        ..Default::default()
    };
    let inputs = [
        ("aes-128", ImplementationClass::Hardware, "cracen", "time (ms)\n1\n2\n3\n"),
        ("aes-128", ImplementationClass::Software, "rustcrypto", "time (ms)\n10\n20\n30\n"),
        ("ecc-mult", ImplementationClass::Hardware, "cracen", "time (ms)\n7\n"),
    ];
    let datasets: Vec<Dataset> = inputs
        .iter()
        .map(|&(operation, class, tag, csv)| {
            let path = PathBuf::from(format!("nrf/{}-{}.csv", operation, tag));
            Dataset {
                table: SampleTable::from_reader(csv.as_bytes(), &path).unwrap(),
                file: MeasurementFile {
                    platform: Platform::Nrf,
                    operation: operation.to_string(),
                    class,
                    tag: tag.to_string(),
                    path,
                },
            }
        })
        .collect();
    let results = ResultTable::build(&datasets, &settings).unwrap();

    AnalysisReport {
        platform: Platform::Nrf,
        started_at: "2026-01-01T00:00:00+00:00".to_string(),
        duration_ms: 12,
        config_summary: ConfigSummary {
            implementation: None,
            confidence_level: settings.confidence_level,
            ci_method: settings.method,
            time_unit: settings.time_unit,
            metrics: settings.metrics.clone(),
            measurements_dir: PathBuf::from("measurements"),
        },
        files: datasets.into_iter().map(|d| d.file).collect(),
        skipped: vec![SkippedFile {
            path: PathBuf::from("nrf/sha2-256-pac.csv"),
            reason: "bad row".to_string(),
        }],
        incomplete: results.incomplete(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn time_only(root: &Path, platform: Platform) -> Config {
        let mut config = Config::for_platform(platform);
        config.analysis.measurements_dir = root.to_path_buf();
        config.analysis.metrics = vec![Metric::Time];
        config
    }

    #[test]
    fn test_run_requires_platform() {
        assert!(run_analysis(&Config::default()).is_err());
    }

    #[test]
    fn test_run_no_matching_files() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nrf");
        fs::create_dir(&dir).unwrap();
        write(&dir, "unknown-vendor.csv", "time (ms)\n1\n");

        let err = run_analysis(&time_only(root.path(), Platform::Nrf)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::NoMatchingFiles { .. })
        ));
    }

    #[test]
    fn test_skip_policy_records_failures() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nrf");
        fs::create_dir(&dir).unwrap();
        write(&dir, "aes-128-cracen.csv", "time (ms)\n1\n2\n");
        write(&dir, "aes-128-rustcrypto.csv", "time (ms)\nbroken\n");

        let mut config = time_only(root.path(), Platform::Nrf);
        config.analysis.on_parse_error = ParsePolicy::Skip;
        let report = run_analysis(&config).unwrap();

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.incomplete.len(), 1);

        config.analysis.on_parse_error = ParsePolicy::Abort;
        let err = run_analysis(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::Parse { .. })
        ));
    }

    #[test]
    fn test_file_averages_in_milliseconds() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("stm");
        fs::create_dir(&dir).unwrap();
        write(&dir, "aes-128-pac.csv", "time (s)\n0.001\n0.003\n");

        let averages =
            file_averages(root.path(), &Platform::ALL, Unit::Milliseconds).unwrap();
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].platform, Platform::Stm);
        assert!((averages[0].mean - 2.0).abs() < 1e-9);
        assert_eq!(averages[0].samples, 2);
    }
}

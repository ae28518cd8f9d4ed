//! CSV ingestion into column-oriented sample tables
//!
//! Recognized headers:
//!
//! | Header              | Metric  | Unit            |
//! |---------------------|---------|-----------------|
//! | `time (ms)`         | Time    | from the header |
//! | `time (s)`          | Time    | from the header |
//! | `Avg Current (mA)`  | Current | mA              |
//! | `Avg Power (mW)`    | Power   | mW              |
//!
//! Other columns are ignored. Matching is case-insensitive and tolerant of
//! extra whitespace.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::{AnalysisError, Result};
use crate::types::{Metric, Unit};

lazy_static! {
    static ref TIME_HEADER: Regex = Regex::new(r"(?i)^time\s*\(\s*(s|ms|us|µs)\s*\)$").unwrap();
    static ref CURRENT_HEADER: Regex =
        Regex::new(r"(?i)^(?:avg\s+)?current\s*\(\s*ma\s*\)$").unwrap();
    static ref POWER_HEADER: Regex = Regex::new(r"(?i)^(?:avg\s+)?power\s*\(\s*mw\s*\)$").unwrap();
}

/// Map a header to the metric it carries and its declared unit
pub fn recognize_header(header: &str) -> Option<(Metric, Unit)> {
    let header = header.trim();
    if let Some(caps) = TIME_HEADER.captures(header) {
        return Unit::parse_time(&caps[1]).map(|unit| (Metric::Time, unit));
    }
    if CURRENT_HEADER.is_match(header) {
        return Some((Metric::Current, Unit::MilliAmps));
    }
    if POWER_HEADER.is_match(header) {
        return Some((Metric::Power, Unit::MilliWatts));
    }
    None
}

/// One column of samples with its declared unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub header: String,
    pub unit: Unit,
    pub values: Vec<f64>,
}

impl Series {
    /// Values expressed in `target`, converting each sample.
    ///
    /// Returns `None` if the units measure different quantities.
    pub fn values_in(&self, target: Unit) -> Option<Vec<f64>> {
        let factor = self.unit.factor_to(target)?;
        if factor == 1.0 {
            return Some(self.values.clone());
        }
        Some(self.values.iter().map(|v| v * factor).collect())
    }
}

/// Parsed measurement file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleTable {
    pub source: PathBuf,
    rows: usize,
    series: BTreeMap<Metric, Series>,
}

impl SampleTable {
    /// Load a CSV file from disk
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_reader(file, path)
    }

    /// Parse CSV content from any reader; `source` is used in error messages
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| csv_error(source, &e))?
            .clone();

        // (column index, metric)
        let mut columns: Vec<(usize, Metric)> = Vec::new();
        let mut series: BTreeMap<Metric, Series> = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let Some((metric, unit)) = recognize_header(header) else {
                continue;
            };
            if series.contains_key(&metric) {
                debug!("Ignoring duplicate {} column '{}'", metric, header);
                continue;
            }
            columns.push((idx, metric));
            series.insert(
                metric,
                Series {
                    header: header.to_string(),
                    unit,
                    values: Vec::new(),
                },
            );
        }

        if !series.contains_key(&Metric::Time) {
            return Err(AnalysisError::MissingColumn {
                path: source.to_path_buf(),
                column: "time (ms)".to_string(),
            });
        }

        let mut rows = 0;
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(source, &e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            for &(idx, metric) in &columns {
                let raw = record.get(idx).unwrap_or("");
                let value = parse_value(raw).ok_or_else(|| AnalysisError::Parse {
                    path: source.to_path_buf(),
                    line,
                    message: format!("non-numeric value '{}' in column {}", raw, metric),
                })?;
                if let Some(s) = series.get_mut(&metric) {
                    s.values.push(value);
                }
            }
            rows += 1;
        }

        debug!("Loaded {} rows, {} metric columns", rows, series.len());
        Ok(SampleTable {
            source: source.to_path_buf(),
            rows,
            series,
        })
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn series(&self, metric: Metric) -> Option<&Series> {
        self.series.get(&metric)
    }

    /// Like [`series`](Self::series) but a missing column is an error
    pub fn require(&self, metric: Metric) -> Result<&Series> {
        self.series(metric)
            .ok_or_else(|| AnalysisError::MissingColumn {
                path: self.source.clone(),
                column: metric.label().to_string(),
            })
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.series.keys().copied()
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn csv_error(source: &Path, err: &csv::Error) -> AnalysisError {
    AnalysisError::Parse {
        path: source.to_path_buf(),
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(content: &str) -> Result<SampleTable> {
        SampleTable::from_reader(content.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn test_recognize_headers() {
        assert_eq!(
            recognize_header("time (ms)"),
            Some((Metric::Time, Unit::Milliseconds))
        );
        assert_eq!(
            recognize_header("time (s)"),
            Some((Metric::Time, Unit::Seconds))
        );
        assert_eq!(
            recognize_header(" Avg Current (mA) "),
            Some((Metric::Current, Unit::MilliAmps))
        );
        assert_eq!(
            recognize_header("Avg Power (mW)"),
            Some((Metric::Power, Unit::MilliWatts))
        );
        assert_eq!(recognize_header("iteration"), None);
    }

    #[test]
    fn test_parse_all_columns() {
        let table = parse(
            "iteration,time (ms),Avg Current (mA),Avg Power (mW)\n\
             0,10.5,4.2,13.9\n\
             1,11.0,4.1,13.5\n",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.series(Metric::Time).unwrap().values, vec![10.5, 11.0]);
        assert_eq!(table.series(Metric::Current).unwrap().values, vec![4.2, 4.1]);
        assert_eq!(table.series(Metric::Power).unwrap().unit, Unit::MilliWatts);
    }

    #[test]
    fn test_time_only_file() {
        let table = parse("time (s)\n0.010\n0.012\n").unwrap();
        assert_eq!(table.series(Metric::Time).unwrap().unit, Unit::Seconds);
        assert!(table.series(Metric::Current).is_none());
        assert!(matches!(
            table.require(Metric::Power),
            Err(AnalysisError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_seconds_converted_per_sample() {
        let table = parse("time (s)\n0.010\n0.012\n").unwrap();
        let ms = table
            .series(Metric::Time)
            .unwrap()
            .values_in(Unit::Milliseconds)
            .unwrap();
        assert!((ms[0] - 10.0).abs() < 1e-9);
        assert!((ms[1] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_time_column() {
        let err = parse("Avg Power (mW)\n1.0\n").unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { .. }));
    }

    #[test]
    fn test_non_numeric_value() {
        let err = parse("time (ms)\n10\nabc\n").unwrap_err();
        match err {
            AnalysisError::Parse { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("abc"));
            }
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let err = parse("time (ms),Avg Power (mW)\n10,1\n11\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_nan_rejected() {
        assert!(parse("time (ms)\nNaN\n").is_err());
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = parse("time (ms)\n").unwrap();
        assert!(table.is_empty());
    }
}

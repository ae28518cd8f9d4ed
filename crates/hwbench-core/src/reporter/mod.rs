//! Analysis result reporting
//!
//! Formats an [`AnalysisReport`], a flash table, or per-file averages in one
//! of several output formats.
//!
//! # Output Formats
//!
//! - **JSON**: Machine-readable format for further processing
//! - **Console**: Human-readable tables
//! - **Markdown**: Documentation-friendly format for write-ups
//!
//! # Example
//!
//! ```no_run
//! use hwbench_core::reporter::{Reporter, OutputFormat};
//! use hwbench_core::pipeline::AnalysisReport;
//!
//! # fn example(report: AnalysisReport) -> anyhow::Result<()> {
//! let reporter = Reporter::new(OutputFormat::Console);
//! reporter.report(&report)?;
//!
//! // Or write to a file
//! Reporter::new(OutputFormat::Json)
//!     .write_to_file(&report, "results.json")?;
//! # Ok(())
//! # }
//! ```

mod console;
mod json;
mod markdown;

use anyhow::Result;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::AnalysisError;
use crate::flash::FlashTable;
use crate::pipeline::{AnalysisReport, FileAverage};
use crate::results::AggregateResult;
use crate::types::Platform;

pub use console::ConsoleReporter;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Console tables
    #[default]
    Console,
    /// Markdown format for documentation
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Json => "json",
            OutputFormat::JsonPretty => "json-pretty",
            OutputFormat::Console => "console",
            OutputFormat::Markdown => "markdown",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "pretty" => Ok(OutputFormat::JsonPretty),
            "console" | "text" => Ok(OutputFormat::Console),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(AnalysisError::InvalidSelector {
                kind: "output format",
                value: s.to_string(),
                expected: "console, json, json-pretty, markdown",
            }),
        }
    }
}

/// Reporter for analysis results
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    /// Create a new reporter with the specified output format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Report results to stdout
    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        emit(&self.format_results(report)?)
    }

    /// Write results to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, report: &AnalysisReport, path: P) -> Result<()> {
        let output = self.format_results(report)?;
        fs::write(path, output)?;
        Ok(())
    }

    /// Format results as a string
    pub fn format_results(&self, report: &AnalysisReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(report, false),
            OutputFormat::JsonPretty => JsonReporter::format(report, true),
            OutputFormat::Console => ConsoleReporter::format(report),
            OutputFormat::Markdown => MarkdownReporter::format(report),
        }
    }

    pub fn format_flash(&self, platform: Platform, table: &FlashTable) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(table, false),
            OutputFormat::JsonPretty => JsonReporter::format(table, true),
            OutputFormat::Console => ConsoleReporter::format_flash(platform, table),
            OutputFormat::Markdown => MarkdownReporter::format_flash(platform, table),
        }
    }

    pub fn format_averages(&self, averages: &[FileAverage]) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(averages, false),
            OutputFormat::JsonPretty => JsonReporter::format(averages, true),
            OutputFormat::Console => ConsoleReporter::format_averages(averages),
            OutputFormat::Markdown => MarkdownReporter::format_averages(averages),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

/// Print already formatted output to stdout
pub fn emit(output: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// `mean ± half-width`, or `mean ± n/a` when the interval is undefined
pub(crate) fn format_interval(result: &AggregateResult) -> String {
    if result.is_degenerate() {
        format!("{} ± n/a", format_value(result.mean()))
    } else {
        format!(
            "{} ± {}",
            format_value(result.mean()),
            format_value(result.half_width())
        )
    }
}

/// Confidence level as a percentage with at most one decimal
pub(crate) fn format_percent(level: f64) -> String {
    let text = format!("{:.1}", level * 100.0);
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

pub(crate) fn format_value(v: f64) -> String {
    let magnitude = v.abs();
    if magnitude >= 1000.0 {
        format!("{:.1}", v)
    } else if magnitude >= 1.0 || magnitude == 0.0 {
        format!("{:.3}", v)
    } else {
        format!("{:.5}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sample_report;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.95), "95");
        assert_eq!(format_percent(0.57), "57");
        assert_eq!(format_percent(0.975), "97.5");
    }

    #[test]
    fn test_reporter_json_format() {
        let report = sample_report();
        let reporter = Reporter::new(OutputFormat::Json);
        let output = reporter.format_results(&report).unwrap();

        assert!(output.contains("\"platform\":\"nrf\""));
        assert!(output.contains("aes-128"));
    }

    #[test]
    fn test_reporter_console_format() {
        let report = sample_report();
        let reporter = Reporter::new(OutputFormat::Console);
        let output = reporter.format_results(&report).unwrap();

        assert!(output.contains("nrf"));
        assert!(output.contains("aes-128"));
    }

    #[test]
    fn test_reporter_markdown_format() {
        let report = sample_report();
        let reporter = Reporter::new(OutputFormat::Markdown);
        let output = reporter.format_results(&report).unwrap();

        assert!(output.contains("# "));
        assert!(output.contains("| aes-128 |"));
    }

    #[test]
    fn test_default_format() {
        let reporter = Reporter::default();
        assert_eq!(reporter.format(), OutputFormat::Console);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!(
            "json-pretty".parse::<OutputFormat>().unwrap(),
            OutputFormat::JsonPretty
        );
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        Reporter::new(OutputFormat::Markdown)
            .write_to_file(&sample_report(), &path)
            .unwrap();
        let written = fs::read_to_string(path).unwrap();
        assert!(written.starts_with("# "));
    }

    #[test]
    fn test_format_value_precision() {
        assert_eq!(format_value(2.0), "2.000");
        assert_eq!(format_value(0.012345), "0.01235");
        assert_eq!(format_value(12345.0), "12345.0");
    }
}

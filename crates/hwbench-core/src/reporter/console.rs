//! Console reporter
//!
//! Provides human-readable output with box-drawn tables.

use anyhow::Result;
use std::fmt::Write;

use super::{format_interval, format_percent, format_value};
use crate::flash::FlashTable;
use crate::pipeline::{AnalysisReport, FileAverage};
use crate::results::{AggregateResult, Comparison};
use crate::types::{Metric, Platform};

const RULE: &str = "────────────────────────────────────────────────────────────────────────────────";

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format an analysis report for console output
    pub fn format(report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║               HARDWARE VS SOFTWARE CRYPTO RESULTS            ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        let summary = &report.config_summary;
        writeln!(output, "Platform:  {}", report.platform.display_name())?;
        writeln!(output, "Started:   {}", report.started_at)?;
        writeln!(output, "Duration:  {}ms", report.duration_ms)?;
        writeln!(output, "Files:     {}", report.files.len())?;
        writeln!(output)?;

        writeln!(output, "Configuration:")?;
        writeln!(output, "  Measurements:     {}", summary.measurements_dir.display())?;
        writeln!(
            output,
            "  Implementation:   {}",
            summary.implementation.map_or("both", |c| c.label())
        )?;
        writeln!(
            output,
            "  Confidence:       {}% ({})",
            format_percent(summary.confidence_level),
            summary.ci_method
        )?;
        writeln!(output, "  Time unit:        {}", summary.time_unit)?;
        writeln!(output)?;

        for &metric in report.results.metrics() {
            Self::format_metric(&mut output, report, metric)?;
        }

        if !report.incomplete.is_empty() {
            writeln!(output, "{}", RULE)?;
            writeln!(output, "Incomplete comparisons:")?;
            for gap in &report.incomplete {
                writeln!(
                    output,
                    "  • {}: {} only ({} missing)",
                    gap.operation,
                    gap.present.label().to_lowercase(),
                    gap.missing.label().to_lowercase()
                )?;
            }
            writeln!(output)?;
        }

        if !report.skipped.is_empty() {
            writeln!(output, "{}", RULE)?;
            writeln!(output, "Skipped files:")?;
            for skipped in &report.skipped {
                writeln!(output, "  ✗ {}: {}", skipped.path.display(), skipped.reason)?;
            }
            writeln!(output)?;
        }

        Ok(output)
    }

    fn format_metric(output: &mut String, report: &AnalysisReport, metric: Metric) -> Result<()> {
        let rows = report.results.comparisons(metric);
        let unit = rows
            .iter()
            .find_map(|row| row.hardware.or(row.software))
            .map(|r| r.unit.symbol())
            .unwrap_or("");

        writeln!(output, "{}", RULE)?;
        writeln!(output, "{} ({})", metric.label(), unit)?;
        writeln!(output, "{}", RULE)?;
        writeln!(output)?;

        writeln!(output, "  ┌──────────────────────┬──────────────────────┬──────────────────────┬─────────┐")?;
        writeln!(output, "  │ Operation            │             Hardware │             Software │   SW/HW │")?;
        writeln!(output, "  ├──────────────────────┼──────────────────────┼──────────────────────┼─────────┤")?;
        for row in &rows {
            Self::format_row(output, row)?;
        }
        writeln!(output, "  └──────────────────────┴──────────────────────┴──────────────────────┴─────────┘")?;
        writeln!(output)?;

        Ok(())
    }

    fn format_row(output: &mut String, row: &Comparison<'_>) -> Result<()> {
        let cell = |result: Option<&AggregateResult>| {
            result.map_or_else(|| "missing".to_string(), format_interval)
        };
        let speedup = row
            .speedup()
            .map_or_else(|| "-".to_string(), |s| format!("{:.2}x", s));

        writeln!(
            output,
            "  │ {:<20} │ {:>20} │ {:>20} │ {:>7} │",
            row.operation,
            cell(row.hardware),
            cell(row.software),
            speedup
        )?;
        Ok(())
    }

    pub fn format_flash(platform: Platform, table: &FlashTable) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "Flash usage ({}), bytes", platform.display_name())?;
        writeln!(output, "  ┌──────────────────────┬──────────┬──────────┬─────────┐")?;
        writeln!(output, "  │ Operation            │ Hardware │ Software │ Savings │")?;
        writeln!(output, "  ├──────────────────────┼──────────┼──────────┼─────────┤")?;
        for row in table.rows() {
            writeln!(
                output,
                "  │ {:<20} │ {:>8} │ {:>8} │ {:>6.1}% │",
                row.operation,
                row.hardware,
                row.software,
                row.savings() * 100.0
            )?;
        }
        writeln!(output, "  └──────────────────────┴──────────┴──────────┴─────────┘")?;
        writeln!(output)?;

        Ok(output)
    }

    pub fn format_averages(averages: &[FileAverage]) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        let mut current = None;
        for avg in averages {
            if current != Some(avg.platform) {
                current = Some(avg.platform);
                writeln!(output, "{}:", avg.platform.display_name())?;
            }
            let name = avg
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            writeln!(
                output,
                "  {:<40} {:>12} {}  (n={})",
                name,
                format_value(avg.mean),
                avg.unit,
                avg.samples
            )?;
        }
        if averages.is_empty() {
            writeln!(output, "No measurement files found.")?;
        }
        writeln!(output)?;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sample_report;
    use crate::types::Unit;
    use std::path::PathBuf;

    #[test]
    fn test_console_format_contains_rows() {
        let output = ConsoleReporter::format(&sample_report()).unwrap();

        assert!(output.contains("HARDWARE VS SOFTWARE"));
        assert!(output.contains("Platform:  NRF"));
        assert!(output.contains("Time (ms)"));
        assert!(output.contains("aes-128"));
        assert!(output.contains("10.00x"));
    }

    #[test]
    fn test_console_flags_incomplete_and_degenerate() {
        let output = ConsoleReporter::format(&sample_report()).unwrap();

        assert!(output.contains("7.000 ± n/a"));
        assert!(output.contains("missing"));
        assert!(output.contains("ecc-mult: hardware only (software missing)"));
        assert!(output.contains("Skipped files:"));
    }

    #[test]
    fn test_console_confidence_level_rounded() {
        let mut report = sample_report();
        report.config_summary.confidence_level = 0.57;
        let output = ConsoleReporter::format(&report).unwrap();

        assert!(output.contains("Confidence:       57% (normal)"));
        assert!(!output.contains("56.99"));
    }

    #[test]
    fn test_console_flash_table() {
        let output =
            ConsoleReporter::format_flash(Platform::Nrf, &FlashTable::reference(Platform::Nrf))
                .unwrap();
        assert!(output.contains("AES-ECB-128"));
        assert!(output.contains("7692"));
        assert!(output.contains("13368"));
    }

    #[test]
    fn test_console_averages_grouped_by_platform() {
        let averages = vec![
            FileAverage {
                platform: Platform::Nrf,
                path: PathBuf::from("nrf/aes-128-cracen.csv"),
                mean: 1.5,
                unit: Unit::Milliseconds,
                samples: 4,
            },
            FileAverage {
                platform: Platform::Stm,
                path: PathBuf::from("stm/aes-128-pac.csv"),
                mean: 2.5,
                unit: Unit::Milliseconds,
                samples: 4,
            },
        ];
        let output = ConsoleReporter::format_averages(&averages).unwrap();
        assert!(output.contains("NRF:"));
        assert!(output.contains("STM:"));
        assert!(output.contains("aes-128-pac.csv"));
        assert!(output.contains("1.500 ms"));
    }
}

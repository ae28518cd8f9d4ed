//! Markdown reporter for write-ups and pull requests

use anyhow::Result;
use std::fmt::Write;

use super::{format_interval, format_percent, format_value};
use crate::flash::FlashTable;
use crate::pipeline::{AnalysisReport, FileAverage};
use crate::results::AggregateResult;
use crate::types::{Metric, Platform};

/// Markdown format reporter
pub struct MarkdownReporter;

impl MarkdownReporter {
    pub fn format(report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();
        let summary = &report.config_summary;

        writeln!(output, "# Crypto Benchmarks: {}", report.platform.display_name())?;
        writeln!(output)?;
        writeln!(
            output,
            "Mean ± {}% confidence interval ({}), {} files, generated {}.",
            format_percent(summary.confidence_level),
            summary.ci_method,
            report.files.len(),
            report.started_at
        )?;
        writeln!(output)?;

        for &metric in report.results.metrics() {
            Self::format_metric(&mut output, report, metric)?;
        }

        if !report.incomplete.is_empty() {
            writeln!(output, "## Incomplete comparisons")?;
            writeln!(output)?;
            for gap in &report.incomplete {
                writeln!(
                    output,
                    "- `{}`: no {} measurements",
                    gap.operation,
                    gap.missing.label().to_lowercase()
                )?;
            }
            writeln!(output)?;
        }

        if !report.skipped.is_empty() {
            writeln!(output, "## Skipped files")?;
            writeln!(output)?;
            for skipped in &report.skipped {
                writeln!(output, "- `{}`: {}", skipped.path.display(), skipped.reason)?;
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
        let cell = |result: Option<&AggregateResult>| {
            result.map_or_else(|| "missing".to_string(), format_interval)
        };

        writeln!(output, "## {} ({})", metric.label(), unit)?;
        writeln!(output)?;
        writeln!(output, "| Operation | Hardware | Software | SW/HW |")?;
        writeln!(output, "|---|---:|---:|---:|")?;
        for row in &rows {
            writeln!(
                output,
                "| {} | {} | {} | {} |",
                row.operation,
                cell(row.hardware),
                cell(row.software),
                row.speedup()
                    .map_or_else(|| "-".to_string(), |s| format!("{:.2}x", s))
            )?;
        }
        writeln!(output)?;
        Ok(())
    }

    pub fn format_flash(platform: Platform, table: &FlashTable) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "## Flash usage: {}", platform.display_name())?;
        writeln!(output)?;
        writeln!(output, "| Operation | Hardware (B) | Software (B) | Savings |")?;
        writeln!(output, "|---|---:|---:|---:|")?;
        for row in table.rows() {
            writeln!(
                output,
                "| {} | {} | {} | {:.1}% |",
                row.operation,
                row.hardware,
                row.software,
                row.savings() * 100.0
            )?;
        }
        writeln!(output)?;
        Ok(output)
    }

    pub fn format_averages(averages: &[FileAverage]) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "## Per-file averages")?;
        writeln!(output)?;
        writeln!(output, "| Platform | File | Mean | Samples |")?;
        writeln!(output, "|---|---|---:|---:|")?;
        for avg in averages {
            writeln!(
                output,
                "| {} | {} | {} {} | {} |",
                avg.platform.display_name(),
                avg.path.display(),
                format_value(avg.mean),
                avg.unit,
                avg.samples
            )?;
        }
        writeln!(output)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sample_report;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_markdown_table_rows() {
        let output = MarkdownReporter::format(&sample_report()).unwrap();

        assert!(output.starts_with("# Crypto Benchmarks: NRF"));
        assert!(output.contains("## Time (ms)"));
        let aes_row = output
            .lines()
            .find(|l| l.starts_with("| aes-128 |"))
            .unwrap();
        assert_eq!(
            aes_row,
            "| aes-128 | 2.000 ± 1.132 | 20.000 ± 11.316 | 10.00x |"
        );
        assert!(output.contains("| ecc-mult | 7.000 ± n/a | missing | - |"));
        assert!(output.contains("- `ecc-mult`: no software measurements"));
    }

    #[test]
    fn test_markdown_flash() {
        let table = FlashTable::new(vec!["SHA2-256".to_string()], vec![50], vec![200]).unwrap();
        let output = MarkdownReporter::format_flash(Platform::Stm, &table).unwrap();
        assert!(output.contains("| SHA2-256 | 50 | 200 | 75.0% |"));
    }
}

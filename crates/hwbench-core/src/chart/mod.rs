//! SVG bar charts
//!
//! Every chart is written to `<output_dir>/<platform>/`:
//!
//! | Kind         | File                          |
//! |--------------|-------------------------------|
//! | `comparison` | `<metric>_comparison.svg`     |
//! | `split`      | `time_hw_vs_sw_split.svg`     |
//! | `single`     | `<metric>_<hw\|sw>.svg`       |
//! | `flash`      | `flash_usage.svg`             |
//!
//! Charts only read a [`ResultTable`]; operations measured for a single class
//! are left out of comparison charts with a warning.

mod bars;

use plotters::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, instrument, warn};

use crate::config::{Config, OperationGroup};
use crate::error::{AnalysisError, Result};
use crate::flash::FlashTable;
use crate::pipeline::AnalysisReport;
use crate::results::{Comparison, ResultTable};
use crate::types::{ImplementationClass, Metric, Platform};

use bars::{chart_error, draw_panel, Bar, BarGroup, Panel, SeriesStyle};
use bars::{HARDWARE_COLOR, SOFTWARE_COLOR};

/// Which charts to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    Comparison,
    Split,
    Single,
    Flash,
    #[default]
    All,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Comparison => "comparison",
            ChartKind::Split => "split",
            ChartKind::Single => "single",
            ChartKind::Flash => "flash",
            ChartKind::All => "all",
        })
    }
}

impl FromStr for ChartKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comparison" => Ok(ChartKind::Comparison),
            "split" => Ok(ChartKind::Split),
            "single" => Ok(ChartKind::Single),
            "flash" => Ok(ChartKind::Flash),
            "all" => Ok(ChartKind::All),
            _ => Err(AnalysisError::InvalidSelector {
                kind: "chart kind",
                value: s.to_string(),
                expected: "comparison, split, single, flash, all",
            }),
        }
    }
}

/// Output settings for one platform
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Platform-specific output directory
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub log_scale_time: bool,
    pub groups: Vec<OperationGroup>,
}

impl ChartOptions {
    pub fn from_config(config: &Config, platform: Platform) -> Self {
        Self {
            output_dir: config.chart_dir(platform),
            width: config.charts.width,
            height: config.charts.height,
            log_scale_time: config.charts.log_scale_time,
            groups: config.charts.groups.clone(),
        }
    }

    fn log_scale(&self, metric: Metric) -> bool {
        self.log_scale_time && metric == Metric::Time
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

pub fn comparison_file(metric: Metric) -> String {
    format!("{}_comparison.svg", metric.key())
}

pub fn single_file(metric: Metric, class: ImplementationClass) -> String {
    format!("{}_{}.svg", metric.key(), class.short_name())
}

pub const SPLIT_FILE: &str = "time_hw_vs_sw_split.svg";
pub const FLASH_FILE: &str = "flash_usage.svg";

/// Render the charts selected by `kind` for a finished analysis.
///
/// Comparison charts need both classes. They are skipped with a warning when
/// the run was restricted to one implementation or when no operation (or no
/// configured group) has a complete pair.
pub fn render(
    kind: ChartKind,
    report: &AnalysisReport,
    flash: &FlashTable,
    options: &ChartOptions,
) -> Result<Vec<PathBuf>> {
    let table = &report.results;
    let platform = report.platform;
    let filtered = report.config_summary.implementation;
    let mut written = Vec::new();

    let wants = |k: ChartKind| kind == k || kind == ChartKind::All;

    if wants(ChartKind::Comparison) || wants(ChartKind::Split) {
        if let Some(class) = filtered {
            warn!(
                "Run restricted to {} results; skipping comparison charts",
                class.label().to_lowercase()
            );
        } else {
            if wants(ChartKind::Comparison) {
                for &metric in table.metrics() {
                    if !table.comparisons(metric).iter().any(Comparison::is_complete) {
                        warn!(
                            "No operation has both implementations for {}; skipping comparison chart",
                            metric
                        );
                        continue;
                    }
                    written.push(render_comparison(table, platform, metric, options)?);
                }
            }
            if wants(ChartKind::Split) && table.metrics().contains(&Metric::Time) {
                if split_has_pairs(table, &options.groups) {
                    written.push(render_split(table, platform, options)?);
                } else {
                    warn!("No operation group has a complete comparison; skipping split chart");
                }
            }
        }
    }

    if wants(ChartKind::Single) && table.metrics().contains(&Metric::Time) {
        let classes = filtered.map_or(ImplementationClass::ALL.to_vec(), |c| vec![c]);
        for class in classes {
            if table.series(class, Metric::Time).is_empty() {
                warn!("No {} results to chart", class.label().to_lowercase());
                continue;
            }
            written.push(render_single(table, platform, class, Metric::Time, options)?);
        }
    }

    if wants(ChartKind::Flash) {
        written.push(render_flash(flash, platform, options)?);
    }

    Ok(written)
}

fn split_has_pairs(table: &ResultTable, groups: &[OperationGroup]) -> bool {
    groups.iter().any(|group| {
        table
            .select(Metric::Time, &group.operations)
            .rows
            .iter()
            .any(Comparison::is_complete)
    })
}

fn both_classes() -> Vec<SeriesStyle> {
    vec![
        series_style(ImplementationClass::Hardware),
        series_style(ImplementationClass::Software),
    ]
}

fn series_style(class: ImplementationClass) -> SeriesStyle {
    SeriesStyle {
        label: class.label().to_string(),
        color: match class {
            ImplementationClass::Hardware => HARDWARE_COLOR,
            ImplementationClass::Software => SOFTWARE_COLOR,
        },
    }
}

/// Complete comparisons as bar groups; incomplete ones are warned about
fn comparison_groups(rows: &[Comparison<'_>]) -> Vec<BarGroup> {
    rows.iter()
        .filter_map(|row| match (row.hardware, row.software) {
            (Some(hw), Some(sw)) => Some(BarGroup {
                label: row.operation.to_string(),
                bars: vec![Some(Bar::from(hw)), Some(Bar::from(sw))],
            }),
            _ => {
                warn!(
                    "Skipping '{}' in {} chart: only one implementation measured",
                    row.operation, row.metric
                );
                None
            }
        })
        .collect()
}

fn axis_label(rows: &[Comparison<'_>], metric: Metric) -> String {
    match rows.iter().find_map(|row| row.hardware.or(row.software)) {
        Some(result) => format!("{} ({})", metric.label(), result.unit),
        None => metric.label().to_string(),
    }
}

#[instrument(skip(table, options))]
pub fn render_comparison(
    table: &ResultTable,
    platform: Platform,
    metric: Metric,
    options: &ChartOptions,
) -> Result<PathBuf> {
    let rows = table.comparisons(metric);
    let panel = Panel {
        title: format!("{}: {} (hardware vs software)", platform.display_name(), metric.label()),
        y_desc: axis_label(&rows, metric),
        series: both_classes(),
        groups: comparison_groups(&rows),
        log_scale: options.log_scale(metric),
    };

    let path = options.output_dir.join(comparison_file(metric));
    write_svg(&path, options.size(), |root| draw_panel(root, &panel))?;
    Ok(path)
}

/// One panel per configured operation group, time metric only
#[instrument(skip(table, options))]
pub fn render_split(table: &ResultTable, platform: Platform, options: &ChartOptions) -> Result<PathBuf> {
    let metric = Metric::Time;
    let mut panels = Vec::new();

    for group in &options.groups {
        let selection = table.select(metric, &group.operations);
        for name in &selection.missing {
            warn!("Operation '{}' of group '{}' was not measured", name, group.title);
        }
        let groups = comparison_groups(&selection.rows);
        if groups.is_empty() {
            warn!("Group '{}' has nothing to compare; panel dropped", group.title);
            continue;
        }
        panels.push(Panel {
            title: group.title.clone(),
            y_desc: axis_label(&selection.rows, metric),
            series: both_classes(),
            groups,
            log_scale: options.log_scale(metric),
        });
    }

    if panels.is_empty() {
        return Err(AnalysisError::Chart(
            "no operation group has complete comparisons".to_string(),
        ));
    }

    let path = options.output_dir.join(SPLIT_FILE);
    let title = format!("{}: time, hardware vs software", platform.display_name());
    write_svg(&path, options.size(), |root| {
        let body = root.titled(&title, ("sans-serif", 26).into_font()).map_err(chart_error)?;
        let areas = body.split_evenly((1, panels.len()));
        for (area, panel) in areas.iter().zip(&panels) {
            draw_panel(area, panel)?;
        }
        Ok(())
    })?;
    Ok(path)
}

/// Bars for one implementation class only
#[instrument(skip(table, options))]
pub fn render_single(
    table: &ResultTable,
    platform: Platform,
    class: ImplementationClass,
    metric: Metric,
    options: &ChartOptions,
) -> Result<PathBuf> {
    let results = table.series(class, metric);
    let y_desc = match results.first() {
        Some(result) => format!("{} ({})", metric.label(), result.unit),
        None => metric.label().to_string(),
    };
    let panel = Panel {
        title: format!("{}: {} ({})", platform.display_name(), metric.label(), class.label()),
        y_desc,
        series: vec![series_style(class)],
        groups: results
            .iter()
            .map(|result| BarGroup {
                label: result.operation.clone(),
                bars: vec![Some(Bar::from(*result))],
            })
            .collect(),
        log_scale: options.log_scale(metric),
    };

    let path = options.output_dir.join(single_file(metric, class));
    write_svg(&path, options.size(), |root| draw_panel(root, &panel))?;
    Ok(path)
}

#[instrument(skip(flash, options))]
pub fn render_flash(flash: &FlashTable, platform: Platform, options: &ChartOptions) -> Result<PathBuf> {
    flash.validate()?;
    let panel = Panel {
        title: format!("{}: flash usage", platform.display_name()),
        y_desc: "Flash usage (bytes)".to_string(),
        series: both_classes(),
        groups: flash
            .rows()
            .map(|row| BarGroup {
                label: row.operation.to_string(),
                bars: vec![
                    Some(Bar { value: row.hardware as f64, half_width: None }),
                    Some(Bar { value: row.software as f64, half_width: None }),
                ],
            })
            .collect(),
        log_scale: false,
    };

    let path = options.output_dir.join(FLASH_FILE);
    write_svg(&path, options.size(), |root| draw_panel(root, &panel))?;
    Ok(path)
}

fn write_svg<F>(path: &Path, size: (u32, u32), draw: F) -> Result<()>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, plotters::coord::Shift>) -> Result<()>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    draw(&root)?;
    root.present().map_err(chart_error)?;

    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sample_report;
    use pretty_assertions::assert_eq;

    fn options(dir: &Path) -> ChartOptions {
        ChartOptions {
            output_dir: dir.join("nrf"),
            width: 800,
            height: 400,
            log_scale_time: false,
            groups: vec![OperationGroup {
                title: "Symmetric".to_string(),
                operations: vec!["aes-128".to_string(), "sha2-256".to_string()],
            }],
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(comparison_file(Metric::Power), "avg_power_comparison.svg");
        assert_eq!(
            single_file(Metric::Time, ImplementationClass::Software),
            "time_sw.svg"
        );
    }

    #[test]
    fn test_chart_kind_from_str() {
        assert_eq!("split".parse::<ChartKind>().unwrap(), ChartKind::Split);
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_comparison_chart_written() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();
        let path =
            render_comparison(&report.results, Platform::Nrf, Metric::Time, &options(dir.path()))
                .unwrap();

        assert_eq!(path, dir.path().join("nrf").join("time_comparison.svg"));
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("aes-128"));
        // Hardware-only operation is left out
        assert!(!svg.contains("ecc-mult"));
    }

    #[test]
    fn test_split_chart_drops_missing_members() {
        let dir = tempfile::tempdir().unwrap();
        let path = render_split(&sample_report().results, Platform::Nrf, &options(dir.path()))
            .unwrap();
        assert!(path.ends_with(SPLIT_FILE));
        assert!(fs::read_to_string(path).unwrap().contains("Symmetric"));
    }

    #[test]
    fn test_single_chart_log_scale() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.log_scale_time = true;
        let path = render_single(
            &sample_report().results,
            Platform::Nrf,
            ImplementationClass::Hardware,
            Metric::Time,
            &opts,
        )
        .unwrap();
        let svg = fs::read_to_string(path).unwrap();
        assert!(svg.contains("ecc-mult"));
    }

    #[test]
    fn test_render_all() {
        let dir = tempfile::tempdir().unwrap();
        let written = render(
            ChartKind::All,
            &sample_report(),
            &FlashTable::reference(Platform::Nrf),
            &options(dir.path()),
        )
        .unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "time_comparison.svg",
                "time_hw_vs_sw_split.svg",
                "time_hw.svg",
                "time_sw.svg",
                "flash_usage.svg",
            ]
        );
    }

    #[test]
    fn test_render_all_skips_unmatched_groups() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.groups = vec![OperationGroup {
            title: "Symmetric".to_string(),
            operations: vec!["aes-256".to_string(), "sha-256".to_string()],
        }];
        let written = render(
            ChartKind::All,
            &sample_report(),
            &FlashTable::reference(Platform::Nrf),
            &opts,
        )
        .unwrap();

        assert_eq!(written.len(), 4);
        assert!(!written.iter().any(|p| p.ends_with(SPLIT_FILE)));
        assert!(dir.path().join("nrf").join(FLASH_FILE).exists());
    }

    #[test]
    fn test_split_has_pairs() {
        let table = &sample_report().results;
        let group = |ops: &[&str]| OperationGroup {
            title: "g".to_string(),
            operations: ops.iter().map(|s| s.to_string()).collect(),
        };
        assert!(split_has_pairs(table, &[group(&["aes-128"])]));
        assert!(!split_has_pairs(table, &[group(&["ecc-mult", "sha-256"])]));
        assert!(!split_has_pairs(table, &[]));
    }
}

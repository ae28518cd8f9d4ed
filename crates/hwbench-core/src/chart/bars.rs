//! Grouped bar panels with confidence-interval error bars

use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{AnalysisError, Result};
use crate::results::AggregateResult;

/// Share of each category slot covered by bars
const BAR_SPAN: f64 = 0.8;
const FONT: &str = "sans-serif";

pub(crate) const HARDWARE_COLOR: RGBColor = RGBColor(31, 119, 180);
pub(crate) const SOFTWARE_COLOR: RGBColor = RGBColor(255, 127, 14);

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bar {
    pub value: f64,
    /// `None` draws no error bar
    pub half_width: Option<f64>,
}

impl From<&AggregateResult> for Bar {
    fn from(result: &AggregateResult) -> Self {
        Bar {
            value: result.mean(),
            half_width: Some(result.half_width()).filter(|h| h.is_finite()),
        }
    }
}

/// Bars of one category, one slot per series (`None` leaves a gap)
#[derive(Debug, Clone)]
pub(crate) struct BarGroup {
    pub label: String,
    pub bars: Vec<Option<Bar>>,
}

#[derive(Debug, Clone)]
pub(crate) struct SeriesStyle {
    pub label: String,
    pub color: RGBColor,
}

#[derive(Debug, Clone)]
pub(crate) struct Panel {
    pub title: String,
    pub y_desc: String,
    pub series: Vec<SeriesStyle>,
    pub groups: Vec<BarGroup>,
    pub log_scale: bool,
}

impl Panel {
    fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.groups.iter().flat_map(|g| g.bars.iter().flatten())
    }

    /// Smallest positive and largest extent of bars plus error bars
    fn bounds(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = 0.0_f64;
        for bar in self.bars() {
            let hw = bar.half_width.unwrap_or(0.0);
            hi = hi.max(bar.value + hw);
            let low = if bar.value - hw > 0.0 {
                bar.value - hw
            } else {
                bar.value
            };
            if low > 0.0 {
                lo = lo.min(low);
            }
        }
        if hi <= 0.0 {
            hi = 1.0;
        }
        if !lo.is_finite() {
            lo = hi / 10.0;
        }
        (lo, hi)
    }
}

pub(crate) fn chart_error<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::Chart(e.to_string())
}

/// Tick label for position `x`: the category name on integer ticks only
pub(crate) fn category_label(labels: &[&str], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels
        .get(i as usize)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Draw one panel into `area`
pub(crate) fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
) -> Result<()> {
    let n = panel.groups.len();
    if n == 0 {
        return Err(AnalysisError::Chart(format!(
            "nothing to draw for '{}'",
            panel.title
        )));
    }

    let (lo, hi) = panel.bounds();
    let x_range = -0.5..(n as f64 - 0.5);

    let mut builder = ChartBuilder::on(area);
    builder
        .caption(&panel.title, (FONT, 22).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80);

    if panel.log_scale {
        let base = lo / 2.0;
        let mut chart = builder
            .build_cartesian_2d(x_range, (base..hi * 2.0).log_scale())
            .map_err(chart_error)?;
        draw_bars(&mut chart, panel, base)
    } else {
        let mut chart = builder
            .build_cartesian_2d(x_range, 0.0..hi * 1.15)
            .map_err(chart_error)?;
        draw_bars(&mut chart, panel, 0.0)
    }
}

fn draw_bars<'a, DB, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, Y>>,
    panel: &Panel,
    base: f64,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let labels: Vec<&str> = panel.groups.iter().map(|g| g.label.as_str()).collect();
    let format_x = |x: &f64| category_label(&labels, *x);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&format_x)
        .y_desc(panel.y_desc.as_str())
        .axis_desc_style((FONT, 16).into_font())
        .label_style((FONT, 14).into_font())
        .draw()
        .map_err(chart_error)?;

    let width = BAR_SPAN / panel.series.len().max(1) as f64;
    let gap = width * 0.05;

    for (slot, series) in panel.series.iter().enumerate() {
        let color = series.color;
        let offset = -BAR_SPAN / 2.0 + slot as f64 * width;
        let placed: Vec<(f64, Bar)> = panel
            .groups
            .iter()
            .enumerate()
            .filter_map(|(i, group)| {
                let bar = group.bars.get(slot).copied().flatten()?;
                Some((i as f64 + offset, bar))
            })
            .collect();

        chart
            .draw_series(placed.iter().map(|&(x0, bar)| {
                Rectangle::new(
                    [(x0 + gap, base), (x0 + width - gap, bar.value.max(base))],
                    color.filled(),
                )
            }))
            .map_err(chart_error)?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));

        chart
            .draw_series(placed.iter().filter_map(|&(x0, bar)| {
                let hw = bar.half_width?;
                Some(ErrorBar::new_vertical(
                    x0 + width / 2.0,
                    (bar.value - hw).max(base),
                    bar.value.max(base),
                    bar.value + hw,
                    BLACK.filled(),
                    8,
                ))
            }))
            .map_err(chart_error)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font((FONT, 14).into_font())
        .draw()
        .map_err(chart_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(bars: Vec<Option<Bar>>) -> Panel {
        Panel {
            title: "t".to_string(),
            y_desc: "y".to_string(),
            series: vec![SeriesStyle {
                label: "Hardware".to_string(),
                color: HARDWARE_COLOR,
            }],
            groups: bars
                .into_iter()
                .enumerate()
                .map(|(i, bar)| BarGroup {
                    label: format!("op{}", i),
                    bars: vec![bar],
                })
                .collect(),
            log_scale: false,
        }
    }

    #[test]
    fn test_category_label_on_integer_ticks() {
        let labels = ["aes-128", "sha2-256"];
        assert_eq!(category_label(&labels, 0.0), "aes-128");
        assert_eq!(category_label(&labels, 1.0000000001), "sha2-256");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn test_bounds_include_error_bars() {
        let p = panel(vec![
            Some(Bar { value: 10.0, half_width: Some(2.0) }),
            Some(Bar { value: 1.0, half_width: None }),
        ]);
        assert_eq!(p.bounds(), (1.0, 12.0));
    }

    #[test]
    fn test_bounds_without_positive_values() {
        let p = panel(vec![None]);
        assert_eq!(p.bounds(), (0.1, 1.0));
    }

    #[test]
    fn test_degenerate_result_has_no_error_bar() {
        let bar = Bar {
            value: 3.0,
            half_width: Some(f64::NAN).filter(|h| h.is_finite()),
        };
        assert_eq!(bar.half_width, None);
    }
}

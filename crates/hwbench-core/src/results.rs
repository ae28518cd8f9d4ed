//! Aggregation pass and the immutable result table
//!
//! The table is keyed operation → implementation class → metric and is built
//! once from the ingested files. Operations observed for only one class are
//! kept; [`ResultTable::incomplete`] lists them so presentation code can warn
//! and skip instead of failing.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::discovery::MeasurementFile;
use crate::error::{AnalysisError, Result};
use crate::ingest::SampleTable;
use crate::stats::{
    coefficient_of_variation, mean_and_ci, CiMethod, ConfidenceInterval, SampleSummary,
    DEFAULT_CONFIDENCE_LEVEL,
};
use crate::types::{ImplementationClass, Metric, Unit};

/// Parameters of the aggregation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationSettings {
    pub confidence_level: f64,
    pub method: CiMethod,
    /// Unit every time column is converted to
    pub time_unit: Unit,
    pub metrics: Vec<Metric>,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            method: CiMethod::Normal,
            time_unit: Unit::Milliseconds,
            metrics: Metric::ALL.to_vec(),
        }
    }
}

/// Mean and CI of one (operation, class, metric)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub operation: String,
    pub class: ImplementationClass,
    pub metric: Metric,
    pub unit: Unit,
    pub interval: ConfidenceInterval,
    pub summary: SampleSummary,
    pub source: PathBuf,
}

impl AggregateResult {
    pub fn mean(&self) -> f64 {
        self.interval.mean
    }

    pub fn half_width(&self) -> f64 {
        self.interval.half_width
    }

    pub fn is_degenerate(&self) -> bool {
        self.interval.is_degenerate()
    }

    pub fn coefficient_of_variation(&self) -> f64 {
        coefficient_of_variation(self.interval.mean, self.interval.std_dev)
    }
}

/// A file paired with its parsed samples
#[derive(Debug, Clone)]
pub struct Dataset {
    pub file: MeasurementFile,
    pub table: SampleTable,
}

/// Aggregate one metric of one table.
///
/// Time columns are converted to `settings.time_unit` sample by sample; other
/// metrics keep their declared unit.
pub fn aggregate_metric(
    table: &SampleTable,
    metric: Metric,
    settings: &AggregationSettings,
) -> Result<(Unit, ConfidenceInterval, SampleSummary)> {
    let series = table.require(metric)?;

    let converted = if metric == Metric::Time {
        series
            .values_in(settings.time_unit)
            .map(|values| (settings.time_unit, values))
    } else {
        None
    };
    let (unit, values) = converted.unwrap_or_else(|| (series.unit, series.values.clone()));

    let empty = || AnalysisError::EmptyInput {
        metric: format!("{} in {}", metric, table.source.display()),
    };
    let summary = SampleSummary::from_samples(&values).ok_or_else(empty)?;
    let interval = mean_and_ci(&values, settings.confidence_level, settings.method)
        .map_err(|e| match e {
            AnalysisError::EmptyInput { .. } => empty(),
            other => other,
        })?;

    Ok((unit, interval, summary))
}

type ClassMap = BTreeMap<ImplementationClass, BTreeMap<Metric, AggregateResult>>;

/// Immutable aggregation results
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultTable {
    metrics: Vec<Metric>,
    operations: BTreeMap<String, ClassMap>,
}

impl ResultTable {
    /// Aggregate every requested metric of every dataset.
    ///
    /// When two files map to the same (operation, class), the first one in
    /// discovery order is kept and the other is reported as a warning.
    pub fn build(datasets: &[Dataset], settings: &AggregationSettings) -> Result<Self> {
        let mut operations: BTreeMap<String, ClassMap> = BTreeMap::new();

        for dataset in datasets {
            let file = &dataset.file;
            let classes = operations.entry(file.operation.clone()).or_default();
            if classes.contains_key(&file.class) {
                warn!(
                    "Duplicate {} measurements for '{}', ignoring {}",
                    file.class,
                    file.operation,
                    file.path.display()
                );
                continue;
            }

            let mut metrics = BTreeMap::new();
            for &metric in &settings.metrics {
                let (unit, interval, summary) =
                    aggregate_metric(&dataset.table, metric, settings)?;
                if interval.is_degenerate() {
                    warn!(
                        "Only {} sample(s) of {} for '{}' ({}): interval undefined",
                        interval.count, metric, file.operation, file.class
                    );
                }
                metrics.insert(
                    metric,
                    AggregateResult {
                        operation: file.operation.clone(),
                        class: file.class,
                        metric,
                        unit,
                        interval,
                        summary,
                        source: file.path.clone(),
                    },
                );
            }
            debug!(
                "Aggregated '{}' ({}) over {} metrics",
                file.operation,
                file.class,
                metrics.len()
            );
            classes.insert(file.class, metrics);
        }

        Ok(ResultTable {
            metrics: settings.metrics.clone(),
            operations,
        })
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Observed operations in sorted order
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn get(
        &self,
        operation: &str,
        class: ImplementationClass,
        metric: Metric,
    ) -> Option<&AggregateResult> {
        self.operations.get(operation)?.get(&class)?.get(&metric)
    }

    pub fn has_class(&self, operation: &str, class: ImplementationClass) -> bool {
        self.operations
            .get(operation)
            .is_some_and(|classes| classes.contains_key(&class))
    }

    /// One row per observed operation
    pub fn comparisons(&self, metric: Metric) -> Vec<Comparison<'_>> {
        self.operations()
            .map(|op| self.comparison(op, metric))
            .collect()
    }

    fn comparison<'a>(&'a self, operation: &'a str, metric: Metric) -> Comparison<'a> {
        Comparison {
            operation,
            metric,
            hardware: self.get(operation, ImplementationClass::Hardware, metric),
            software: self.get(operation, ImplementationClass::Software, metric),
        }
    }

    /// Rows for a named group of operations, in the group's order.
    ///
    /// Names that were never observed are returned in `missing`.
    pub fn select<'a>(&'a self, metric: Metric, operations: &'a [String]) -> Selection<'a> {
        let mut rows = Vec::new();
        let mut missing = Vec::new();
        for op in operations {
            if self.operations.contains_key(op) {
                rows.push(self.comparison(op, metric));
            } else {
                missing.push(op.clone());
            }
        }
        Selection { rows, missing }
    }

    /// Operations observed for a single implementation class
    pub fn incomplete(&self) -> Vec<IncompleteComparison> {
        self.operations
            .iter()
            .filter_map(|(op, classes)| {
                let present: Vec<_> = classes.keys().copied().collect();
                match present.as_slice() {
                    [only] => Some(IncompleteComparison {
                        operation: op.clone(),
                        present: *only,
                        missing: only.other(),
                    }),
                    _ => None,
                }
            })
            .collect()
    }

    /// Results of one class for one metric, in operation order
    pub fn series(&self, class: ImplementationClass, metric: Metric) -> Vec<&AggregateResult> {
        self.operations()
            .filter_map(|op| self.get(op, class, metric))
            .collect()
    }
}

/// Hardware/software pair for one operation and metric
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Comparison<'a> {
    pub operation: &'a str,
    pub metric: Metric,
    pub hardware: Option<&'a AggregateResult>,
    pub software: Option<&'a AggregateResult>,
}

impl<'a> Comparison<'a> {
    pub fn is_complete(&self) -> bool {
        self.hardware.is_some() && self.software.is_some()
    }

    pub fn get(&self, class: ImplementationClass) -> Option<&'a AggregateResult> {
        match class {
            ImplementationClass::Hardware => self.hardware,
            ImplementationClass::Software => self.software,
        }
    }

    /// Software mean divided by hardware mean
    pub fn speedup(&self) -> Option<f64> {
        let hw = self.hardware?.mean();
        let sw = self.software?.mean();
        if hw == 0.0 {
            None
        } else {
            Some(sw / hw)
        }
    }
}

/// Result of [`ResultTable::select`]
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub rows: Vec<Comparison<'a>>,
    pub missing: Vec<String>,
}

/// An operation that cannot be compared across classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteComparison {
    pub operation: String,
    pub present: ImplementationClass,
    pub missing: ImplementationClass,
}

//! Configuration for an analysis run
//!
//! Platform and implementation selectors are plain fields, so runs are driven
//! from a TOML file, CLI flags, or code. Every section is optional.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::{default_rules, ClassificationRule, Classifier};
use crate::flash::FlashTable;
use crate::results::AggregationSettings;
use crate::stats::{check_level, CiMethod, DEFAULT_CONFIDENCE_LEVEL};
use crate::types::{ImplementationClass, Metric, Platform, Unit};

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Selectors and statistics
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Ordered filename classification rules
    #[serde(default = "default_rules")]
    pub rules: Vec<ClassificationRule>,
    /// Chart output
    #[serde(default)]
    pub charts: ChartsConfig,
    /// Flash usage tables overriding the reference values
    #[serde(default)]
    pub flash: FlashConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            rules: default_rules(),
            charts: ChartsConfig::default(),
            flash: FlashConfig::default(),
        }
    }
}

impl Config {
    /// Default configuration for one platform
    pub fn for_platform(platform: Platform) -> Self {
        let mut config = Self::default();
        config.analysis.platform = Some(platform);
        config
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or a selector holds a value outside its enumerated set.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use hwbench_core::config::Config;
    /// use hwbench_core::Platform;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_str(r#"
    ///     [analysis]
    ///     platform = "nrf"
    ///     confidence_level = 0.99
    /// "#)?;
    /// assert_eq!(config.analysis.platform, Some(Platform::Nrf));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        check_level(self.analysis.confidence_level)?;
        if self.analysis.metrics.is_empty() {
            bail!("At least one metric must be selected");
        }
        if !self.analysis.time_unit.is_time() {
            bail!("time_unit must be one of s, ms, us");
        }
        if self.rules.is_empty() {
            bail!("At least one classification rule is required");
        }
        if let Some(rule) = self.rules.iter().find(|r| r.tag.trim().is_empty()) {
            bail!("Classification rule for {} has an empty tag", rule.class);
        }
        for (platform, table) in self.flash.configured() {
            table
                .validate()
                .with_context(|| format!("Invalid flash table for {}", platform))?;
        }
        Ok(())
    }

    /// The platform selector, which every measurement command needs
    pub fn require_platform(&self) -> anyhow::Result<Platform> {
        match self.analysis.platform {
            Some(platform) => Ok(platform),
            None => bail!("No platform selected (expected one of: nrf, stm)"),
        }
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.rules.clone())
    }

    pub fn aggregation_settings(&self) -> AggregationSettings {
        AggregationSettings {
            confidence_level: self.analysis.confidence_level,
            method: self.analysis.ci_method,
            time_unit: self.analysis.time_unit,
            metrics: self.analysis.metrics.clone(),
        }
    }

    /// Configured flash table, falling back to the reference sizes
    pub fn flash_table(&self, platform: Platform) -> FlashTable {
        let configured = match platform {
            Platform::Nrf => self.flash.nrf.as_ref(),
            Platform::Stm => self.flash.stm.as_ref(),
        };
        configured
            .cloned()
            .unwrap_or_else(|| FlashTable::reference(platform))
    }

    /// Directory charts for `platform` are written to
    pub fn chart_dir(&self, platform: Platform) -> PathBuf {
        self.charts.output_dir.join(platform.dir_name())
    }
}

/// What to do when a measurement file fails to parse
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Stop the whole run
    #[default]
    Abort,
    /// Drop the file, warn, and keep going
    Skip,
}

/// Selectors and statistics parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Platform to analyze
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Restrict the run to one implementation class
    #[serde(default)]
    pub implementation: Option<ImplementationClass>,
    /// Confidence level of the intervals (default: 0.95)
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Interval estimator (default: normal)
    #[serde(default)]
    pub ci_method: CiMethod,
    /// Root holding one sub-directory per platform (default: measurements)
    #[serde(default = "default_measurements_dir")]
    pub measurements_dir: PathBuf,
    /// Metrics every file must provide (default: time, current, power)
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
    /// Unit time columns are reported in (default: ms)
    #[serde(default = "default_time_unit")]
    pub time_unit: Unit,
    /// Parse failure policy (default: abort)
    #[serde(default)]
    pub on_parse_error: ParsePolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            platform: None,
            implementation: None,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            ci_method: CiMethod::default(),
            measurements_dir: default_measurements_dir(),
            metrics: default_metrics(),
            time_unit: default_time_unit(),
            on_parse_error: ParsePolicy::default(),
        }
    }
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

fn default_measurements_dir() -> PathBuf {
    PathBuf::from("measurements")
}

fn default_metrics() -> Vec<Metric> {
    Metric::ALL.to_vec()
}

fn default_time_unit() -> Unit {
    Unit::Milliseconds
}

/// Chart output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Root directory; charts go to `<output_dir>/<platform>/` (default: plots)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Draw time charts on a logarithmic axis
    #[serde(default)]
    pub log_scale_time: bool,
    /// Figure width in pixels (default: 1400)
    #[serde(default = "default_width")]
    pub width: u32,
    /// Figure height in pixels (default: 500)
    #[serde(default = "default_height")]
    pub height: u32,
    /// Operation groups for the split time chart
    #[serde(default = "default_groups")]
    pub groups: Vec<OperationGroup>,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            log_scale_time: false,
            width: default_width(),
            height: default_height(),
            groups: default_groups(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("plots")
}

fn default_width() -> u32 {
    1400
}

fn default_height() -> u32 {
    500
}

fn default_groups() -> Vec<OperationGroup> {
    vec![
        OperationGroup {
            title: "Symmetric operations".to_string(),
            operations: vec!["aes-128".to_string(), "sha2-256".to_string()],
        },
        OperationGroup {
            title: "Asymmetric operations".to_string(),
            operations: vec![
                "ecdsa-sign".to_string(),
                "ecdsa-verify".to_string(),
                "ecc-mult".to_string(),
            ],
        },
    ]
}

/// Named subset of operations drawn in one panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationGroup {
    pub title: String,
    pub operations: Vec<String>,
}

/// Per-platform flash tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlashConfig {
    #[serde(default)]
    pub nrf: Option<FlashTable>,
    #[serde(default)]
    pub stm: Option<FlashTable>,
}

impl FlashConfig {
    fn configured(&self) -> impl Iterator<Item = (Platform, &FlashTable)> {
        [(Platform::Nrf, self.nrf.as_ref()), (Platform::Stm, self.stm.as_ref())]
            .into_iter()
            .filter_map(|(platform, table)| table.map(|t| (platform, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.analysis.platform, None);
        assert_eq!(config.analysis.confidence_level, 0.95);
        assert_eq!(config.analysis.ci_method, CiMethod::Normal);
        assert_eq!(config.analysis.measurements_dir, PathBuf::from("measurements"));
        assert_eq!(config.analysis.metrics, Metric::ALL.to_vec());
        assert_eq!(config.analysis.time_unit, Unit::Milliseconds);
        assert_eq!(config.analysis.on_parse_error, ParsePolicy::Abort);
        assert_eq!(config.rules, default_rules());
        assert_eq!(config.charts.output_dir, PathBuf::from("plots"));
        assert!(!config.charts.log_scale_time);
        assert_eq!(config.charts.groups.len(), 2);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [analysis]
            platform = "stm"
            implementation = "sw"
            confidence_level = 0.99
            ci_method = "student-t"
            measurements_dir = "data"
            metrics = ["time"]
            time_unit = "s"
            on_parse_error = "skip"

            [[rules]]
            tag = "mbedtls"
            class = "software"

            [[rules]]
            tag = "hash"
            class = "hw"

            [charts]
            output_dir = "out"
            log_scale_time = true
            width = 800
            height = 400

            [[charts.groups]]
            title = "Hashes"
            operations = ["sha2-256"]

            [flash.stm]
            operations = ["SHA2-256"]
            hardware = [100]
            software = [200]
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.analysis.platform, Some(Platform::Stm));
        assert_eq!(
            config.analysis.implementation,
            Some(ImplementationClass::Software)
        );
        assert_eq!(config.analysis.ci_method, CiMethod::StudentT);
        assert_eq!(config.analysis.metrics, vec![Metric::Time]);
        assert_eq!(config.analysis.time_unit, Unit::Seconds);
        assert_eq!(config.analysis.on_parse_error, ParsePolicy::Skip);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[1].class, ImplementationClass::Hardware);
        assert!(config.charts.log_scale_time);
        assert_eq!(config.charts.groups[0].title, "Hashes");
        assert_eq!(config.flash_table(Platform::Stm).hardware, vec![100]);
        assert_eq!(
            config.flash_table(Platform::Nrf),
            FlashTable::reference(Platform::Nrf)
        );
        assert_eq!(config.chart_dir(Platform::Stm), PathBuf::from("out/stm"));
    }

    #[test]
    fn test_invalid_platform_rejected() {
        let toml = r#"
            [analysis]
            platform = "esp32"
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_invalid_confidence_level_rejected() {
        let toml = r#"
            [analysis]
            confidence_level = 1.5
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_non_time_unit_rejected() {
        let toml = r#"
            [analysis]
            time_unit = "mW"
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_bad_flash_table_rejected() {
        let toml = r#"
            [flash.nrf]
            operations = ["A", "B"]
            hardware = [1]
            software = [1, 2]
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_require_platform() {
        assert!(Config::default().require_platform().is_err());
        assert_eq!(
            Config::for_platform(Platform::Nrf).require_platform().unwrap(),
            Platform::Nrf
        );
    }

    #[test]
    fn test_aggregation_settings_follow_config() {
        let mut config = Config::for_platform(Platform::Nrf);
        config.analysis.confidence_level = 0.9;
        config.analysis.metrics = vec![Metric::Power];
        let settings = config.aggregation_settings();
        assert_eq!(settings.confidence_level, 0.9);
        assert_eq!(settings.metrics, vec![Metric::Power]);
    }
}

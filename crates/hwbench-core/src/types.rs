//! Enumerated selectors and measurement vocabulary shared by every stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Microcontroller platform a measurement set was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Nordic nRF (CRACEN accelerator)
    Nrf,
    /// STMicroelectronics STM32 (PAC-driven peripherals)
    Stm,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Nrf, Platform::Stm];

    /// Sub-directory name used for both measurements and plots
    pub fn dir_name(&self) -> &'static str {
        match self {
            Platform::Nrf => "nrf",
            Platform::Stm => "stm",
        }
    }

    /// Upper-case name used in chart titles
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Nrf => "NRF",
            Platform::Stm => "STM",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Platform {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nrf" => Ok(Platform::Nrf),
            "stm" => Ok(Platform::Stm),
            _ => Err(AnalysisError::InvalidSelector {
                kind: "platform",
                value: s.to_string(),
                expected: "nrf, stm",
            }),
        }
    }
}

/// Whether an operation ran on the accelerator or in a software library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImplementationClass {
    #[serde(alias = "hw")]
    Hardware,
    #[serde(alias = "sw")]
    Software,
}

impl ImplementationClass {
    pub const ALL: [ImplementationClass; 2] =
        [ImplementationClass::Hardware, ImplementationClass::Software];

    pub fn short_name(&self) -> &'static str {
        match self {
            ImplementationClass::Hardware => "hw",
            ImplementationClass::Software => "sw",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImplementationClass::Hardware => "Hardware",
            ImplementationClass::Software => "Software",
        }
    }

    pub fn other(&self) -> ImplementationClass {
        match self {
            ImplementationClass::Hardware => ImplementationClass::Software,
            ImplementationClass::Software => ImplementationClass::Hardware,
        }
    }
}

impl fmt::Display for ImplementationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ImplementationClass {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hw" | "hardware" => Ok(ImplementationClass::Hardware),
            "sw" | "software" => Ok(ImplementationClass::Software),
            _ => Err(AnalysisError::InvalidSelector {
                kind: "implementation",
                value: s.to_string(),
                expected: "hw, sw",
            }),
        }
    }
}

/// Measured quantity, one per recognized CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Time,
    Current,
    Power,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Time, Metric::Current, Metric::Power];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Time => "Time",
            Metric::Current => "Avg Current",
            Metric::Power => "Avg Power",
        }
    }

    /// Stable key used in file names and JSON
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Time => "time",
            Metric::Current => "avg_current",
            Metric::Power => "avg_power",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(Metric::Time),
            "current" | "avg_current" => Ok(Metric::Current),
            "power" | "avg_power" => Ok(Metric::Power),
            _ => Err(AnalysisError::InvalidSelector {
                kind: "metric",
                value: s.to_string(),
                expected: "time, current, power",
            }),
        }
    }
}

/// Declared unit of a column. Every series carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "us")]
    Microseconds,
    #[serde(rename = "mA")]
    MilliAmps,
    #[serde(rename = "mW")]
    MilliWatts,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Seconds => "s",
            Unit::Milliseconds => "ms",
            Unit::Microseconds => "us",
            Unit::MilliAmps => "mA",
            Unit::MilliWatts => "mW",
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(self, Unit::Seconds | Unit::Milliseconds | Unit::Microseconds)
    }

    /// Multiplier that converts a value in `self` into `target`.
    ///
    /// Returns `None` when the units measure different quantities.
    pub fn factor_to(&self, target: Unit) -> Option<f64> {
        if *self == target {
            return Some(1.0);
        }
        if !(self.is_time() && target.is_time()) {
            return None;
        }
        let seconds = |u: Unit| match u {
            Unit::Seconds => 1.0,
            Unit::Milliseconds => 1e-3,
            _ => 1e-6,
        };
        Some(seconds(*self) / seconds(target))
    }

    pub(crate) fn parse_time(s: &str) -> Option<Unit> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" => Some(Unit::Seconds),
            "ms" => Some(Unit::Milliseconds),
            "us" | "µs" => Some(Unit::Microseconds),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

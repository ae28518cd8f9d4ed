//! Flash footprint comparison
//!
//! Sizes are the sum of the `.text`, `.rodata` and `.data` sections of the
//! release binary for each benchmark, as reported by `cargo size -- -A`.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::types::Platform;

/// Flash usage in bytes per operation, hardware build next to software build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashTable {
    pub operations: Vec<String>,
    pub hardware: Vec<u64>,
    pub software: Vec<u64>,
}

/// One operation of a [`FlashTable`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashRow<'a> {
    pub operation: &'a str,
    pub hardware: u64,
    pub software: u64,
}

impl FlashRow<'_> {
    /// Fraction of the software footprint saved by the hardware build
    pub fn savings(&self) -> f64 {
        if self.software == 0 {
            return 0.0;
        }
        1.0 - self.hardware as f64 / self.software as f64
    }
}

impl FlashTable {
    pub fn new(operations: Vec<String>, hardware: Vec<u64>, software: Vec<u64>) -> Result<Self> {
        let table = Self {
            operations,
            hardware,
            software,
        };
        table.validate()?;
        Ok(table)
    }

    /// Sizes measured on the reference firmware builds
    pub fn reference(platform: Platform) -> Self {
        let operations = ["AES-ECB-128", "SHA2-256", "EC-MULT", "ECDSA-SIGN-VERIFY"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (hardware, software) = match platform {
            Platform::Nrf => (
                vec![7692, 8704, 13424, 19652],
                vec![13368, 15276, 31920, 46824],
            ),
            Platform::Stm => (
                vec![7928, 7536, 8688, 10040],
                vec![13340, 15908, 28176, 47044],
            ),
        };
        Self {
            operations,
            hardware,
            software,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.operations.is_empty() {
            return Err(AnalysisError::InvalidFlashTable(
                "no operations".to_string(),
            ));
        }
        if self.hardware.len() != self.operations.len()
            || self.software.len() != self.operations.len()
        {
            return Err(AnalysisError::InvalidFlashTable(format!(
                "{} operations but {} hardware and {} software sizes",
                self.operations.len(),
                self.hardware.len(),
                self.software.len()
            )));
        }
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = FlashRow<'_>> {
        self.operations
            .iter()
            .zip(self.hardware.iter().zip(&self.software))
            .map(|(op, (&hardware, &software))| FlashRow {
                operation: op,
                hardware,
                software,
            })
    }

    pub fn max_size(&self) -> u64 {
        self.hardware
            .iter()
            .chain(&self.software)
            .copied()
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_tables_are_valid() {
        for platform in Platform::ALL {
            FlashTable::reference(platform).validate().unwrap();
        }
    }

    #[test]
    fn test_reference_values() {
        let nrf = FlashTable::reference(Platform::Nrf);
        let first = nrf.rows().next().unwrap();
        assert_eq!(first.operation, "AES-ECB-128");
        assert_eq!(first.hardware, 7692);
        assert_eq!(first.software, 13368);
        assert_eq!(FlashTable::reference(Platform::Stm).max_size(), 47044);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = FlashTable::new(vec!["AES".to_string()], vec![1, 2], vec![3]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidFlashTable(_)));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(FlashTable::new(vec![], vec![], vec![]).is_err());
    }

    #[test]
    fn test_savings() {
        let table = FlashTable::new(vec!["X".to_string()], vec![25], vec![100]).unwrap();
        let row = table.rows().next().unwrap();
        assert!((row.savings() - 0.75).abs() < 1e-12);
    }
}

//! Measurement file discovery for a platform directory.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::classify::{file_name_for, Classifier};
use crate::error::{AnalysisError, Result};
use crate::types::{ImplementationClass, Platform};

/// A classified measurement file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasurementFile {
    pub platform: Platform,
    pub operation: String,
    pub class: ImplementationClass,
    pub tag: String,
    pub path: PathBuf,
}

impl MeasurementFile {
    /// Canonical `<operation>-<tag>.<ext>` name for this file
    pub fn file_name(&self) -> String {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv");
        file_name_for(&self.operation, &self.tag, ext)
    }
}

/// Directory holding the measurements of `platform`
pub fn platform_dir(root: &Path, platform: Platform) -> PathBuf {
    root.join(platform.dir_name())
}

/// List the `.csv` files of a directory sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AnalysisError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| AnalysisError::io(dir, e))? {
        let entry = entry.map_err(|e| AnalysisError::io(dir, e))?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Enumerate and classify the measurement files of one platform.
///
/// Files that match no rule, or whose class differs from `only`, are skipped.
/// An empty result is not an error here; the pipeline decides whether data is
/// required.
#[instrument(skip(classifier), fields(platform = %platform))]
pub fn discover(
    root: &Path,
    platform: Platform,
    classifier: &Classifier,
    only: Option<ImplementationClass>,
) -> Result<Vec<MeasurementFile>> {
    let dir = platform_dir(root, platform);
    let mut found = Vec::new();

    for path in list_csv_files(&dir)? {
        let Some(base) = path.file_name().and_then(|n| n.to_str()) else {
            debug!("Skipping non UTF-8 file name: {}", path.display());
            continue;
        };

        let Some(classification) = classifier.classify(base) else {
            debug!("No implementation tag in {}, skipping", base);
            continue;
        };

        if only.is_some_and(|class| class != classification.class) {
            continue;
        }

        debug!(
            "{} -> {} ({})",
            base, classification.operation, classification.class
        );
        found.push(MeasurementFile {
            platform,
            operation: classification.operation,
            class: classification.class,
            tag: classification.tag,
            path,
        });
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "time (ms)\n1\n").unwrap();
    }

    #[test]
    fn test_discover_classifies_and_skips() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nrf");
        fs::create_dir(&dir).unwrap();
        touch(&dir, "aes-128-cracen.csv");
        touch(&dir, "aes-128-rustcrypto.csv");
        touch(&dir, "unknown-vendor.csv");
        touch(&dir, "notes-cracen.txt");

        let files = discover(root.path(), Platform::Nrf, &Classifier::default(), None).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].operation, "aes-128");
        assert_eq!(files[0].class, ImplementationClass::Hardware);
        assert_eq!(files[1].class, ImplementationClass::Software);
        assert_eq!(files[1].file_name(), "aes-128-rustcrypto.csv");
    }

    #[test]
    fn test_discover_filters_by_class() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("stm");
        fs::create_dir(&dir).unwrap();
        touch(&dir, "sha2-256-pac.csv");
        touch(&dir, "sha2-256-rustcrypto.csv");

        let files = discover(
            root.path(),
            Platform::Stm,
            &Classifier::default(),
            Some(ImplementationClass::Software),
        )
        .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].tag, "rustcrypto");
    }

    #[test]
    fn test_discover_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let err = discover(root.path(), Platform::Nrf, &Classifier::default(), None).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingDirectory(_)));
    }
}

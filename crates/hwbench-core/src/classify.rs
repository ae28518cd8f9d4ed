//! Filename classification
//!
//! Measurement files follow the `<operation>-<tag>.csv` convention, where the
//! tag names the crate or driver that ran the operation. An ordered rule list
//! maps tags to an [`ImplementationClass`]; the first rule whose tag occurs in
//! the base name wins.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::ImplementationClass;

/// A single `(tag substring, class)` rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub tag: String,
    pub class: ImplementationClass,
}

impl ClassificationRule {
    pub fn new(tag: impl Into<String>, class: ImplementationClass) -> Self {
        Self {
            tag: tag.into(),
            class,
        }
    }
}

/// Result of classifying one file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub operation: String,
    pub class: ImplementationClass,
    /// The rule tag that matched
    pub tag: String,
}

/// Ordered rule list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

/// Tags used by the nRF (CRACEN), STM (PAC) and RustCrypto firmware builds
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new("cracen", ImplementationClass::Hardware),
        ClassificationRule::new("pac", ImplementationClass::Hardware),
        ClassificationRule::new("rustcrypto", ImplementationClass::Software),
    ]
}

impl Classifier {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classify a file by its base name.
    ///
    /// Returns `None` when no rule matches; callers skip such files.
    ///
    /// # Examples
    ///
    /// ```
    /// use hwbench_core::classify::Classifier;
    /// use hwbench_core::ImplementationClass;
    ///
    /// let classifier = Classifier::default();
    /// let c = classifier.classify("aes-128-cracen.csv").unwrap();
    /// assert_eq!(c.operation, "aes-128");
    /// assert_eq!(c.class, ImplementationClass::Hardware);
    /// assert!(classifier.classify("unknown-vendor.csv").is_none());
    /// ```
    pub fn classify(&self, file_name: &str) -> Option<Classification> {
        let rule = self
            .rules
            .iter()
            .find(|rule| !rule.tag.is_empty() && file_name.contains(rule.tag.as_str()))?;

        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);

        Some(Classification {
            operation: operation_key(stem, &rule.tag),
            class: rule.class,
            tag: rule.tag.clone(),
        })
    }
}

/// Strip `-<tag>` from a file stem.
///
/// A trailing suffix is the normal case; otherwise the first occurrence is
/// removed, and a stem without `-<tag>` is returned unchanged.
pub fn operation_key(stem: &str, tag: &str) -> String {
    let suffix = format!("-{}", tag);
    match stem.strip_suffix(suffix.as_str()) {
        Some(op) => op.to_string(),
        None => stem.replacen(suffix.as_str(), "", 1),
    }
}

/// Rebuild `<operation>-<tag>.<ext>`
pub fn file_name_for(operation: &str, tag: &str, extension: &str) -> String {
    format!("{}-{}.{}", operation, tag, extension)
}

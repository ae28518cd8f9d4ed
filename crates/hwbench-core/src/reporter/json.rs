//! JSON reporter

use anyhow::Result;
use serde::Serialize;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format any report as JSON.
    ///
    /// Undefined interval half-widths (NaN) are written as `null`.
    pub fn format<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(output)
    }
}

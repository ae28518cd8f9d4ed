use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid {kind}: '{value}' (expected one of: {expected})")]
    InvalidSelector {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Confidence level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("Measurement directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("No measurement files for {platform} in {}", .dir.display())]
    NoMatchingFiles { platform: String, dir: PathBuf },

    #[error("Failed to parse {} at line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Column '{column}' missing from {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("No samples to aggregate for {metric}")]
    EmptyInput { metric: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid flash table: {0}")]
    InvalidFlashTable(String),

    #[error("Chart rendering failed: {0}")]
    Chart(String),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }

    /// Per-file failures that the `skip` policy may step over.
    pub fn is_file_local(&self) -> bool {
        matches!(
            self,
            AnalysisError::Parse { .. } | AnalysisError::MissingColumn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

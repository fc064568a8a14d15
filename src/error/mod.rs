//! Error handling for `cogscore`.

use std::io;
use std::path::PathBuf;

pub mod util;

/// Errors raised while loading norms, scoring submissions or touching the results log
#[derive(Debug, thiserror::Error)]
pub enum CogScoreError {
    /// One or more reference sources could not be found or parsed.
    ///
    /// Fatal at startup: no submission is accepted without the full battery.
    #[error("Missing reference source(s): {}", .sources.join(", "))]
    MissingReferenceSource {
        /// Every source that failed to resolve, in configured order
        sources: Vec<String>,
    },

    /// A reference source exists but is not a well-formed norms table
    #[error("Invalid reference source {}: {detail}", .path.display())]
    InvalidReferenceSource { path: PathBuf, detail: String },

    /// The results log could not be written; no row was committed
    #[error("Failed to write results log {}: {source}", .path.display())]
    LogWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A row was rejected before reaching the results log
    #[error("Rejected results log row for {}: {detail}", .path.display())]
    LogSchema { path: PathBuf, detail: String },

    /// The results log exists but cannot be parsed as tabular data
    #[error("Results log {} is corrupt at line {line}: {detail}", .path.display())]
    LogCorrupt {
        path: PathBuf,
        line: u64,
        detail: String,
    },

    /// Submission failed validation; nothing was written
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error opening or reading a file
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CogScoreError {
    /// Whether the caller should report the error and keep serving submissions
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::LogCorrupt { .. }
                | Self::LogWrite { .. }
                | Self::LogSchema { .. }
                | Self::InvalidSubmission(_)
        )
    }

    /// Whether the error belongs to the write path of the results log
    #[must_use]
    pub fn is_log_write(&self) -> bool {
        matches!(self, Self::LogWrite { .. } | Self::LogSchema { .. })
    }
}

/// Result type for `cogscore` operations
pub type Result<T> = std::result::Result<T, CogScoreError>;

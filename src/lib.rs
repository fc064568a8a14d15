//! Age-normed standardization of cognitive test scores.
//!
//! Raw scores for a fixed battery of tests are converted to standardized
//! scores using per-age normative tables, and every submission is appended to
//! an append-only CSV results log that can be read back as history.

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod result_log;
pub mod session;
pub mod standardize;
pub mod utils;

// Re-export the most common types for easier use
pub use config::{ScoringConfig, TestSource};
pub use error::{CogScoreError, Result};
pub use loader::{load_reference_tables, read_reference_table};
pub use models::{
    LogRow, NormativeRow, PatientSubmission, ReferenceTable, ReferenceTables, TestScore,
};
pub use result_log::{LogState, ResultLog};
pub use session::ScoringSession;
pub use standardize::{round2, standardize, standardize_all};

//! Domain models for normative scoring
//!
//! Reference tables hold the age norms for each test, a submission carries one
//! patient's raw scores, and a log row is what gets persisted per submission.

pub mod log_row;
pub mod reference;
pub mod submission;

// Re-export commonly used types
pub use log_row::{LogRow, TestScore};
pub use reference::{NormativeRow, ReferenceTable, ReferenceTables};
pub use submission::{MAX_AGE, MIN_AGE, PatientSubmission, StandardizedResult};

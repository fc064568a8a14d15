//! Scoring session
//!
//! Ties the pieces together for one deployment: the battery, its loaded norms
//! and the results log. A submission is validated and fully scored before the
//! log is touched, so a failure never leaves a partial row behind.

use std::path::Path;

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::loader::load_reference_tables;
use crate::models::{LogRow, PatientSubmission, ReferenceTables};
use crate::result_log::ResultLog;
use crate::standardize::standardize_all;
use crate::utils::logging::log::log_submission;

/// A configured, ready-to-score deployment
#[derive(Debug)]
pub struct ScoringSession {
    config: ScoringConfig,
    tables: ReferenceTables,
    log: ResultLog,
}

impl ScoringSession {
    /// Validate the configuration and load every reference table
    ///
    /// Fails with `MissingReferenceSource` if any table cannot be loaded.
    pub fn open(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        let tables = load_reference_tables(&config)?;
        Ok(Self::from_parts(config, tables))
    }

    /// Build a session from tables that are already loaded
    #[must_use]
    pub fn from_parts(config: ScoringConfig, tables: ReferenceTables) -> Self {
        let log = ResultLog::from_config(&config);
        Self {
            config,
            tables,
            log,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    #[must_use]
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    #[must_use]
    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    /// Score a submission without recording it
    pub fn score(&self, submission: &PatientSubmission) -> Result<LogRow> {
        submission.validate(&self.config)?;
        let scores = standardize_all(submission, &self.tables, &self.config)?;

        Ok(LogRow {
            name: submission.name.clone(),
            age: submission.age,
            timestamp: submission.submitted_at,
            scores,
        })
    }

    /// Score a submission and append it to the results log
    ///
    /// Returns the row as written.
    pub fn submit(&self, submission: &PatientSubmission) -> Result<LogRow> {
        let row = self.score(submission)?;
        self.log.append(&row)?;
        log_submission(&row, self.log.path());
        Ok(row)
    }

    /// Full history, in append order
    pub fn history(&self) -> Result<Vec<LogRow>> {
        self.log.read_all()
    }

    /// Copy the results log verbatim to `dest`
    pub fn export_to(&self, dest: &Path) -> Result<Option<u64>> {
        self.log.export_to(dest)
    }
}

//! Patient submissions
//!
//! A submission is transient: it lives for the processing of one form entry and
//! is folded into a [`LogRow`](super::LogRow) once every score is computed.

use std::collections::HashMap;

use chrono::{Local, NaiveDateTime, SubsecRound};

use crate::config::ScoringConfig;
use crate::error::{CogScoreError, Result};
use crate::models::TestScore;

/// Youngest accepted patient age
pub const MIN_AGE: u32 = 1;
/// Oldest accepted patient age
pub const MAX_AGE: u32 = 120;

/// Raw and standardized score per test, in battery order
pub type StandardizedResult = Vec<TestScore>;

/// One patient's raw scores for the battery
#[derive(Debug, Clone, PartialEq)]
pub struct PatientSubmission {
    pub name: String,
    pub age: u32,
    pub raw_scores: HashMap<String, f64>,
    /// Local time of submission, truncated to whole seconds
    pub submitted_at: NaiveDateTime,
}

impl PatientSubmission {
    /// Create a submission stamped with the current local time
    #[must_use]
    pub fn new(name: impl Into<String>, age: u32, raw_scores: HashMap<String, f64>) -> Self {
        Self::at(name, age, raw_scores, Local::now().naive_local())
    }

    /// Create a submission with an explicit timestamp
    #[must_use]
    pub fn at(
        name: impl Into<String>,
        age: u32,
        raw_scores: HashMap<String, f64>,
        submitted_at: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            raw_scores,
            submitted_at: submitted_at.trunc_subsecs(0),
        }
    }

    /// Raw score entered for a test
    #[must_use]
    pub fn raw_score(&self, test_name: &str) -> Option<f64> {
        self.raw_scores.get(test_name).copied()
    }

    /// Check the submission against the configured battery
    ///
    /// Every configured test needs a finite raw score and no score may name a
    /// test outside the battery.
    pub fn validate(&self, config: &ScoringConfig) -> Result<()> {
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(CogScoreError::InvalidSubmission(format!(
                "age {} is outside {MIN_AGE}-{MAX_AGE}",
                self.age
            )));
        }

        for test in config.test_names() {
            match self.raw_score(test) {
                Some(raw) if raw.is_finite() => {}
                Some(raw) => {
                    return Err(CogScoreError::InvalidSubmission(format!(
                        "raw score for '{test}' is not a number: {raw}"
                    )));
                }
                None => {
                    return Err(CogScoreError::InvalidSubmission(format!(
                        "missing raw score for '{test}'"
                    )));
                }
            }
        }

        let mut unknown: Vec<&str> = self
            .raw_scores
            .keys()
            .map(String::as_str)
            .filter(|name| !config.test_names().any(|t| t == *name))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(CogScoreError::InvalidSubmission(format!(
                "unknown test(s): {}",
                unknown.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TestSource;
    use chrono::{NaiveDate, Timelike};

    fn config() -> ScoringConfig {
        ScoringConfig::with_tests(vec![
            TestSource::new("Aprendizaje Serial", "AprendizajeSerial.csv"),
            TestSource::new("Reconocimiento", "Reconocimiento.csv"),
        ])
    }

    fn scores(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_timestamp_truncated_to_seconds() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(9, 15, 30, 750)
            .unwrap();
        let submission = PatientSubmission::at("Ana", 30, HashMap::new(), at);
        assert_eq!(submission.submitted_at.nanosecond(), 0);
        assert_eq!(submission.submitted_at.second(), 30);
    }

    #[test]
    fn test_valid_submission() {
        let submission = PatientSubmission::new(
            "Ana",
            30,
            scores(&[("Aprendizaje Serial", 25.0), ("Reconocimiento", 12.0)]),
        );
        assert!(submission.validate(&config()).is_ok());
    }

    #[test]
    fn test_age_bounds() {
        let full = scores(&[("Aprendizaje Serial", 25.0), ("Reconocimiento", 12.0)]);
        assert!(PatientSubmission::new("A", 0, full.clone()).validate(&config()).is_err());
        assert!(PatientSubmission::new("A", 121, full.clone()).validate(&config()).is_err());
        assert!(PatientSubmission::new("A", 1, full.clone()).validate(&config()).is_ok());
        assert!(PatientSubmission::new("A", 120, full).validate(&config()).is_ok());
    }

    #[test]
    fn test_missing_and_unknown_scores() {
        let missing = PatientSubmission::new("A", 30, scores(&[("Aprendizaje Serial", 25.0)]));
        let err = missing.validate(&config()).unwrap_err();
        assert!(err.to_string().contains("missing raw score for 'Reconocimiento'"));

        let unknown = PatientSubmission::new(
            "A",
            30,
            scores(&[
                ("Aprendizaje Serial", 25.0),
                ("Reconocimiento", 12.0),
                ("Fluidez", 3.0),
            ]),
        );
        let err = unknown.validate(&config()).unwrap_err();
        assert!(err.to_string().contains("Fluidez"));
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let submission = PatientSubmission::new(
            "A",
            30,
            scores(&[("Aprendizaje Serial", f64::NAN), ("Reconocimiento", 12.0)]),
        );
        assert!(submission.validate(&config()).is_err());
    }
}

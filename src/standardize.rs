//! Standardization of raw scores against age norms
//!
//! The engine is pure: it never touches the file system and never fails for a
//! missing norm. An absent result is a normal outcome meaning "no applicable
//! norm", distinct from any numeric score.

use crate::config::ScoringConfig;
use crate::error::{CogScoreError, Result};
use crate::models::{
    PatientSubmission, ReferenceTable, ReferenceTables, StandardizedResult, TestScore,
};

/// Round to two decimals, half away from zero (`f64::round` semantics)
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Standardized score of `raw_score` for a patient of `age`
///
/// Returns `None` when the table has no row for exactly `age` or when that
/// row's standard deviation is zero. Otherwise `(raw - mean) / sd`, rounded by
/// [`round2`].
#[must_use]
pub fn standardize(age: u32, raw_score: f64, table: &ReferenceTable) -> Option<f64> {
    let norm = table.lookup(age)?;
    if norm.std_dev == 0.0 {
        return None;
    }

    let z = round2((raw_score - norm.mean) / norm.std_dev);
    z.is_finite().then_some(z)
}

/// Run [`standardize`] for every test of the battery, in configured order
///
/// Each entry pairs the submitted raw score with its standardized score.
/// Fails only when the submission is missing a score or the tables do not
/// cover the battery; absent results are part of the `Ok` value.
pub fn standardize_all(
    submission: &PatientSubmission,
    tables: &ReferenceTables,
    config: &ScoringConfig,
) -> Result<StandardizedResult> {
    config
        .test_names()
        .map(|test| {
            let table = tables
                .get(test)
                .ok_or_else(|| CogScoreError::MissingReferenceSource {
                    sources: vec![test.to_string()],
                })?;
            let raw = submission.raw_score(test).ok_or_else(|| {
                CogScoreError::InvalidSubmission(format!("missing raw score for '{test}'"))
            })?;

            let z = standardize(submission.age, raw, table);
            if z.is_none() {
                log::debug!("No applicable norm for '{test}' at age {}", submission.age);
            }
            Ok::<_, CogScoreError>(TestScore::new(test, raw, z))
        })
        .collect()
}

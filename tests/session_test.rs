mod utils;

use std::collections::HashMap;
use std::fs;

use cogscore::{CogScoreError, LogState, PatientSubmission, ScoringSession};
use utils::{RECOGNITION, SERIAL, at, write_battery};

fn scores(serial: f64, recognition: f64) -> HashMap<String, f64> {
    HashMap::from([(SERIAL.to_string(), serial), (RECOGNITION.to_string(), recognition)])
}

#[test]
fn test_submit_scores_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let session = ScoringSession::open(write_battery(dir.path())).unwrap();

    let row = session
        .submit(&PatientSubmission::at("Ana", 30, scores(25.0, 13.0), at(0)))
        .unwrap();
    assert_eq!(row.score(SERIAL).unwrap().z, Some(1.0));
    assert_eq!(row.score(RECOGNITION).unwrap().z, Some(1.5));
    assert_eq!(row.score(SERIAL).unwrap().raw, 25.0);
    assert_eq!(row.score(RECOGNITION).unwrap().raw, 13.0);

    let history = session.history().unwrap();
    assert_eq!(history, vec![row]);
}

#[test]
fn test_absent_norms_are_recorded_not_errors() {
    let dir = tempfile::tempdir().unwrap();
    let session = ScoringSession::open(write_battery(dir.path())).unwrap();

    // No Aprendizaje Serial norm at 65; age 31 has zero deviation
    let old = session
        .submit(&PatientSubmission::at("Luis", 65, scores(25.0, 12.0), at(1)))
        .unwrap();
    assert_eq!(old.score(SERIAL).unwrap().z, None);
    assert_eq!(old.score(RECOGNITION).unwrap().z, Some(1.0));

    let flat = session
        .submit(&PatientSubmission::at("Marta", 31, scores(25.0, 12.0), at(2)))
        .unwrap();
    assert_eq!(flat.score(SERIAL).unwrap().z, None);
    assert_eq!(flat.score(RECOGNITION).unwrap().z, None);

    assert_eq!(session.history().unwrap().len(), 2);
}

#[test]
fn test_invalid_submission_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let session = ScoringSession::open(write_battery(dir.path())).unwrap();

    let mut partial = scores(25.0, 13.0);
    partial.remove(RECOGNITION);
    let err = session
        .submit(&PatientSubmission::at("Ana", 30, partial, at(0)))
        .unwrap_err();
    assert!(matches!(err, CogScoreError::InvalidSubmission(_)));

    let err = session
        .submit(&PatientSubmission::at("Ana", 0, scores(25.0, 13.0), at(0)))
        .unwrap_err();
    assert!(matches!(err, CogScoreError::InvalidSubmission(_)));

    assert_eq!(session.log().state(), LogState::Absent);
}

#[test]
fn test_open_fails_fast_on_missing_norms() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_battery(dir.path());
    fs::remove_file(dir.path().join("Reconocimiento.csv")).unwrap();

    let err = ScoringSession::open(config).unwrap_err();
    assert!(matches!(err, CogScoreError::MissingReferenceSource { .. }));
    assert!(!dir.path().join("resultados.csv").exists());
}

#[test]
fn test_export_is_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let session = ScoringSession::open(write_battery(dir.path())).unwrap();
    session
        .submit(&PatientSubmission::at("Ana", 30, scores(25.0, 13.0), at(0)))
        .unwrap();

    let dest = dir.path().join("download.csv");
    session.export_to(&dest).unwrap();
    assert_eq!(
        fs::read(&dest).unwrap(),
        fs::read(dir.path().join("resultados.csv")).unwrap()
    );
}

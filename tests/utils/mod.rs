//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use cogscore::{LogRow, ScoringConfig, TestScore, TestSource};

pub const SERIAL: &str = "Aprendizaje Serial";
pub const RECOGNITION: &str = "Reconocimiento";

/// Two-test battery with norms written into `dir`
///
/// Aprendizaje Serial: age 30 (20, 5), age 31 (20, 0), duplicate age 30 after.
/// Reconocimiento: age 30 (10, 2), age 65 (8, 4).
pub fn write_battery(dir: &Path) -> ScoringConfig {
    fs::write(
        dir.join("AprendizajeSerial.csv"),
        "Age,Media,DesviacionEstandar\n30,20.0,5.0\n31,20.0,0.0\n30,99.0,1.0\n",
    )
    .unwrap();
    fs::write(
        dir.join("Reconocimiento.csv"),
        "Edad,Media,DesviacionEstandar\n30,10.0,2.0\n65,8.0,4.0\n",
    )
    .unwrap();

    ScoringConfig {
        reference_dir: dir.to_path_buf(),
        log_path: dir.join("resultados.csv"),
        tests: vec![
            TestSource::new(SERIAL, "AprendizajeSerial.csv"),
            TestSource::new(RECOGNITION, "Reconocimiento.csv"),
        ],
    }
}

/// Fixed timestamp a number of minutes past 2024-03-05 09:00
pub fn at(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(9, minute, 0)
        .unwrap()
}

pub fn sample_row(name: &str, minute: u32, serial_z: Option<f64>) -> LogRow {
    LogRow {
        name: name.to_string(),
        age: 30,
        timestamp: at(minute),
        scores: vec![
            TestScore::new(SERIAL, 25.0, serial_z),
            TestScore::new(RECOGNITION, 12.25, Some(1.13)),
        ],
    }
}

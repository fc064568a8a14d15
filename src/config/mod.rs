//! Configuration for `cogscore`.
//!
//! The battery (which tests exist, their order, and where their norms live)
//! is fixed for a deployment. The order drives the column layout of the
//! results log, so changing it after rows exist produces a log whose header
//! no longer matches new rows.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CogScoreError, Result};

/// Default results log file name
pub const DEFAULT_LOG_FILE: &str = "resultados.csv";

/// One test of the battery and the source of its normative table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSource {
    /// Human-readable test name, also used in log column names
    pub name: String,
    /// CSV file with `Age`, `Media`, `DesviacionEstandar` columns
    pub source: PathBuf,
}

impl TestSource {
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Configuration for a scoring deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Directory that relative reference sources resolve against
    pub reference_dir: PathBuf,
    /// Path of the append-only results log
    pub log_path: PathBuf,
    /// Ordered test battery
    pub tests: Vec<TestSource>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("."),
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
            tests: default_battery(),
        }
    }
}

/// The memory battery the tool ships with
#[must_use]
pub fn default_battery() -> Vec<TestSource> {
    vec![
        TestSource::new("Recuerdo Logico Inmediato", "RecuerdoLogicoInmediato.csv"),
        TestSource::new("Recuerdo Logico Diferido", "RecuerdoLogicoDiferido.csv"),
        TestSource::new("Aprendizaje Serial", "AprendizajeSerial.csv"),
        TestSource::new("Rec. Clave Semántica", "RecConClaveSemantica.csv"),
        TestSource::new("Recuerdo Serial", "RecuerdoSerial.csv"),
        TestSource::new("Reconocimiento", "Reconocimiento.csv"),
    ]
}

impl ScoringConfig {
    /// Build a configuration from a battery, keeping the default paths
    #[must_use]
    pub fn with_tests(tests: Vec<TestSource>) -> Self {
        Self {
            tests,
            ..Default::default()
        }
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(contents)
            .map_err(|e| CogScoreError::Config(format!("Failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    ///
    /// Relative `reference_dir` and `log_path` entries are taken relative to
    /// the directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CogScoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;

        if let Some(base) = path.parent() {
            if config.reference_dir.is_relative() {
                config.reference_dir = base.join(&config.reference_dir);
            }
            if config.log_path.is_relative() {
                config.log_path = base.join(&config.log_path);
            }
        }
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check the battery is usable
    pub fn validate(&self) -> Result<()> {
        if self.tests.is_empty() {
            return Err(CogScoreError::Config(
                "At least one test must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for test in &self.tests {
            let name = test.name.trim();
            if name.is_empty() {
                return Err(CogScoreError::Config("Test names cannot be empty".to_string()));
            }
            if !seen.insert(name) {
                return Err(CogScoreError::Config(format!("Duplicate test name: {name}")));
            }
        }
        Ok(())
    }

    /// Resolved location of a test's reference source
    #[must_use]
    pub fn source_path(&self, test: &TestSource) -> PathBuf {
        if test.source.is_absolute() {
            test.source.clone()
        } else {
            self.reference_dir.join(&test.source)
        }
    }

    /// Test names in battery order
    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|t| t.name.as_str())
    }
}

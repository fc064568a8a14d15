//! Persisted results log rows

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the results log
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed leading columns of every log
pub const NAME_COLUMN: &str = "Name";
pub const AGE_COLUMN: &str = "Age";
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

const RAW_SUFFIX: &str = " - Bruto";
const Z_SUFFIX: &str = " - Z";

/// Column holding a test's raw score
#[must_use]
pub fn raw_column(test_name: &str) -> String {
    format!("{test_name}{RAW_SUFFIX}")
}

/// Column holding a test's standardized score
#[must_use]
pub fn z_column(test_name: &str) -> String {
    format!("{test_name}{Z_SUFFIX}")
}

/// Test name of a raw-score column, if `column` is one
#[must_use]
pub fn test_of_raw_column(column: &str) -> Option<&str> {
    column.strip_suffix(RAW_SUFFIX)
}

/// Test name of a standardized-score column, if `column` is one
#[must_use]
pub fn test_of_z_column(column: &str) -> Option<&str> {
    column.strip_suffix(Z_SUFFIX)
}

/// Full header for a battery, in order
#[must_use]
pub fn header_for<'a, I>(test_names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut columns = vec![
        NAME_COLUMN.to_string(),
        AGE_COLUMN.to_string(),
        TIMESTAMP_COLUMN.to_string(),
    ];
    for test in test_names {
        columns.push(raw_column(test));
        columns.push(z_column(test));
    }
    columns
}

/// Raw and standardized score of one test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScore {
    pub test: String,
    pub raw: f64,
    /// `None` when the test has no norm for the age or a zero deviation
    pub z: Option<f64>,
}

impl TestScore {
    #[must_use]
    pub fn new(test: impl Into<String>, raw: f64, z: Option<f64>) -> Self {
        Self {
            test: test.into(),
            raw,
            z,
        }
    }
}

/// One submission as stored in the results log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub name: String,
    pub age: u32,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub scores: Vec<TestScore>,
}

impl LogRow {
    /// Score for a test, if the row has it
    #[must_use]
    pub fn score(&self, test_name: &str) -> Option<&TestScore> {
        self.scores.iter().find(|s| s.test == test_name)
    }

    /// Test names in column order
    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.scores.iter().map(|s| s.test.as_str())
    }

    /// Field values in column order; an absent z score is an empty field
    #[must_use]
    pub fn to_record(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(3 + self.scores.len() * 2);
        fields.push(self.name.clone());
        fields.push(self.age.to_string());
        fields.push(self.timestamp.format(TIMESTAMP_FORMAT).to_string());
        for score in &self.scores {
            fields.push(score.raw.to_string());
            fields.push(score.z.map(|z| z.to_string()).unwrap_or_default());
        }
        fields
    }
}

mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

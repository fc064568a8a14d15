//! Normative reference tables
//!
//! A reference table maps an exact age to the mean and standard deviation a
//! test is normed against. Duplicate ages are resolved once, at load time:
//! the first row in source order wins.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CogScoreError, Result};

/// Normative mean and standard deviation for one age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormativeRow {
    pub mean: f64,
    pub std_dev: f64,
}

impl NormativeRow {
    #[must_use]
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

/// One record of a reference source file
#[derive(Debug, Deserialize)]
struct SourceRecord {
    #[serde(rename = "Age", alias = "Edad")]
    age: u32,
    #[serde(rename = "Media")]
    mean: f64,
    #[serde(rename = "DesviacionEstandar")]
    std_dev: f64,
}

/// Age-indexed norms for a single test
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    test_name: String,
    rows: HashMap<u32, NormativeRow>,
    duplicates_dropped: usize,
}

impl ReferenceTable {
    /// Build a table from rows in source order; later duplicate ages are dropped
    pub fn from_rows<I>(test_name: impl Into<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (u32, NormativeRow)>,
    {
        let mut table = Self {
            test_name: test_name.into(),
            rows: HashMap::new(),
            duplicates_dropped: 0,
        };
        for (age, row) in rows {
            match table.rows.entry(age) {
                Entry::Vacant(slot) => {
                    slot.insert(row);
                }
                Entry::Occupied(_) => table.duplicates_dropped += 1,
            }
        }
        table
    }

    /// Parse a CSV norms table
    ///
    /// Requires `Age` (or `Edad`), `Media` and `DesviacionEstandar` headers;
    /// other columns are ignored. `origin` only labels errors.
    pub fn from_reader<R: Read>(
        test_name: impl Into<String>,
        reader: R,
        origin: &Path,
    ) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.deserialize::<SourceRecord>() {
            let record = record.map_err(|e| CogScoreError::InvalidReferenceSource {
                path: origin.to_path_buf(),
                detail: e.to_string(),
            })?;
            rows.push((record.age, NormativeRow::new(record.mean, record.std_dev)));
        }

        Ok(Self::from_rows(test_name, rows))
    }

    /// Test this table norms
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Exact-age lookup; there is no interpolation between ages
    #[must_use]
    pub fn lookup(&self, age: u32) -> Option<&NormativeRow> {
        self.rows.get(&age)
    }

    /// Number of distinct ages
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows discarded because their age was already present
    #[must_use]
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Distinct ages covered, ascending
    #[must_use]
    pub fn ages(&self) -> Vec<u32> {
        let mut ages: Vec<u32> = self.rows.keys().copied().collect();
        ages.sort_unstable();
        ages
    }
}

/// The loaded reference tables for a whole battery
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    tables: HashMap<String, ReferenceTable>,
}

impl ReferenceTables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, keyed by its test name
    pub fn insert(&mut self, table: ReferenceTable) {
        self.tables.insert(table.test_name().to_string(), table);
    }

    #[must_use]
    pub fn get(&self, test_name: &str) -> Option<&ReferenceTable> {
        self.tables.get(test_name)
    }

    #[must_use]
    pub fn contains(&self, test_name: &str) -> bool {
        self.tables.contains_key(test_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<ReferenceTable> for ReferenceTables {
    fn from_iter<T: IntoIterator<Item = ReferenceTable>>(iter: T) -> Self {
        let mut tables = Self::new();
        for table in iter {
            tables.insert(table);
        }
        tables
    }
}

//! Reference table loading
//!
//! Loading is all-or-nothing: every configured source is attempted, each
//! failure is logged on its own, and the batch fails with a single
//! [`CogScoreError::MissingReferenceSource`] naming every unresolved source.

use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use crate::config::{ScoringConfig, TestSource};
use crate::error::util::safe_open_file;
use crate::error::{CogScoreError, Result};
use crate::models::{ReferenceTable, ReferenceTables};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Read one test's reference table from a CSV file
pub fn read_reference_table(test_name: &str, path: &Path) -> Result<ReferenceTable> {
    let file = safe_open_file(path, "reading reference table")?;
    let table = ReferenceTable::from_reader(test_name, BufReader::new(file), path)?;

    if table.duplicates_dropped() > 0 {
        log_warning(
            &format!(
                "Dropped {} duplicate age row(s) for '{test_name}', keeping the first",
                table.duplicates_dropped()
            ),
            Some(path),
        );
    }
    if table.is_empty() {
        log_warning(&format!("Reference table for '{test_name}' has no rows"), Some(path));
    }
    Ok(table)
}

/// Load the reference tables for the whole battery
pub fn load_reference_tables(config: &ScoringConfig) -> Result<ReferenceTables> {
    let start = Instant::now();
    log_operation_start("Loading reference tables from", &config.reference_dir);

    let mut tables = ReferenceTables::new();
    let mut missing = Vec::new();

    for test in &config.tests {
        match load_one(config, test) {
            Ok(table) => tables.insert(table),
            Err(e) => {
                log::error!("{e}");
                missing.push(config.source_path(test).display().to_string());
            }
        }
    }

    if !missing.is_empty() {
        return Err(CogScoreError::MissingReferenceSource { sources: missing });
    }

    log_operation_complete(
        "loaded",
        &config.reference_dir,
        tables.len(),
        Some(start.elapsed()),
    );
    Ok(tables)
}

fn load_one(config: &ScoringConfig, test: &TestSource) -> Result<ReferenceTable> {
    let path = config.source_path(test);
    let table = read_reference_table(&test.name, &path)?;
    log::debug!(
        "Reference table '{}' covers {} ages from {}",
        test.name,
        table.len(),
        path.display()
    );
    Ok(table)
}

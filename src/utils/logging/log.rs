//! Logging utilities
//!
//! Consistent `log` lines for file operations and submissions.

use std::path::Path;
use std::time::Duration;

use crate::models::LogRow;

/// Log the start of an operation on a file or directory
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{operation} {}", path.display());
}

/// Log a completed operation
///
/// # Arguments
/// * `operation` - Past-tense verb, e.g. "loaded"
/// * `path` - File or directory the items came from
/// * `items` - Number of tables or rows handled
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    items: usize,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => log::info!(
            "Successfully {operation} {items} items from {} in {duration:?}",
            path.display()
        ),
        None => log::info!("Successfully {operation} {items} items from {}", path.display()),
    }
}

/// Log a warning, optionally tied to a path
pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message}: {}", path.display()),
        None => log::warn!("{message}"),
    }
}

/// Log a row that was just appended to the results log
///
/// Only the age and score counts are logged; the patient name stays in the log file.
pub fn log_submission(row: &LogRow, log_path: &Path) {
    let absent = row.scores.iter().filter(|s| s.z.is_none()).count();
    log::info!(
        "Recorded submission (age {}, {} tests, {} without norm) to {}",
        row.age,
        row.scores.len(),
        absent,
        log_path.display()
    );
}

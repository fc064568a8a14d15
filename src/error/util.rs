//! Utility functions for error handling
//!
//! File helpers that attach the path and intent to IO failures.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{CogScoreError, Result};

/// Safely open a file for reading with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for the log)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if path.is_dir() {
        return Err(CogScoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Expected a file for: {purpose}"),
            ),
        });
    }

    fs::File::open(path).map_err(|e| {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                log::debug!("Permission denied opening {} for {purpose}", path.display());
            }
            io::ErrorKind::NotFound => {
                log::debug!("{} not found (needed for {purpose})", path.display());
            }
            _ => log::debug!("Failed to open {} for {purpose}: {e}", path.display()),
        }
        CogScoreError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Open a file in append mode, creating it when missing
///
/// The handle is also readable so the current tail can be inspected before
/// writing. Failures map to [`CogScoreError::LogWrite`] since the only
/// appendable store is the results log.
pub fn open_for_append(path: &Path) -> Result<fs::File> {
    fs::OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .map_err(|source| CogScoreError::LogWrite {
            path: path.to_path_buf(),
            source,
        })
}

/// Read a file's bytes, returning `None` when it does not exist
///
/// No encoding is assumed; callers decide how to treat invalid text.
pub fn read_optional_bytes(path: &Path, purpose: &str) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => {
            log::debug!("Failed to read {} for {purpose}: {e}", path.display());
            Err(CogScoreError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}

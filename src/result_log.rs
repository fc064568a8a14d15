//! Append-only results log
//!
//! Every submission becomes one CSV row. The file is created with a header on
//! the first append and only ever grows after that; rows are never rewritten.
//!
//! Appends are serialized through an in-process lock and an exclusive lock on
//! the file itself, so concurrent submissions (threads or separate CLI runs)
//! never interleave and only one of them writes the header. A write that fails
//! partway is cut back to the previous length before the error is returned.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDateTime;

use crate::config::ScoringConfig;
use crate::error::util::{open_for_append, read_optional_bytes};
use crate::error::{CogScoreError, Result};
use crate::models::log_row::{
    AGE_COLUMN, NAME_COLUMN, TIMESTAMP_COLUMN, TIMESTAMP_FORMAT, header_for, test_of_raw_column,
    test_of_z_column,
};
use crate::models::{LogRow, TestScore};

/// Column names written by earlier, Spanish-labelled logs
const LEGACY_LEADING_COLUMNS: [&str; 3] = ["Nombre", "Edad", "Fecha"];

/// Lifecycle of the durable store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogState {
    /// No file yet, or an empty one; the next append writes the header
    Absent,
    /// Header written; appends add rows only
    Initialized,
}

/// The results log for one deployment
#[derive(Debug)]
pub struct ResultLog {
    path: PathBuf,
    tests: Vec<String>,
    columns: Vec<String>,
    write_lock: Mutex<()>,
}

impl ResultLog {
    /// Create a handle for the log at `path` with the given battery order
    ///
    /// Nothing touches the file system until the first append.
    pub fn new<I, S>(path: impl Into<PathBuf>, tests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tests: Vec<String> = tests.into_iter().map(Into::into).collect();
        let columns = header_for(tests.iter().map(String::as_str));
        Self {
            path: path.into(),
            tests,
            columns,
            write_lock: Mutex::new(()),
        }
    }

    /// Log at the configured path for the configured battery
    #[must_use]
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.log_path.clone(), config.test_names())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header this log writes when it creates the file
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn state(&self) -> LogState {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > 0 => LogState::Initialized,
            _ => LogState::Absent,
        }
    }

    /// Append one row, writing the header first if the log does not exist yet
    ///
    /// The row must carry exactly the configured tests, in order. Nothing is
    /// written when it does not. A last line left without its newline by a
    /// manual edit is terminated before the row is added.
    pub fn append(&self, row: &LogRow) -> Result<()> {
        if !row.test_names().eq(self.tests.iter().map(String::as_str)) {
            return Err(CogScoreError::LogSchema {
                path: self.path.clone(),
                detail: format!(
                    "row has tests [{}], log expects [{}]",
                    row.test_names().collect::<Vec<_>>().join(", "),
                    self.tests.join(", ")
                ),
            });
        }

        let write_err = |source: io::Error| CogScoreError::LogWrite {
            path: self.path.clone(),
            source,
        };

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = open_for_append(&self.path)?;
        file.lock().map_err(write_err)?;

        let original_len = file.metadata().map_err(write_err)?.len();
        let write_header = original_len == 0;

        let mut buffer = Vec::new();
        if !write_header && !ends_with_newline(&mut file, original_len).map_err(write_err)? {
            log::warn!("Results log {} did not end with a newline", self.path.display());
            buffer.push(b'\n');
        }
        buffer.extend(self.encode(row, write_header).map_err(write_err)?);

        let committed = commit(&mut file, original_len, &buffer);
        if let Err(e) = file.unlock() {
            log::debug!("Failed to unlock {}: {e}", self.path.display());
        }
        committed.map_err(write_err)?;

        if write_header {
            log::info!("Created results log {}", self.path.display());
        }
        Ok(())
    }

    fn encode(&self, row: &LogRow, with_header: bool) -> io::Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        if with_header {
            writer.write_record(&self.columns).map_err(io::Error::other)?;
        }
        writer.write_record(row.to_record()).map_err(io::Error::other)?;
        writer
            .into_inner()
            .map_err(|e| io::Error::new(e.error().kind(), e.error().to_string()))
    }

    /// Every row ever appended, in append order
    ///
    /// A missing log is an empty history. The file's own header decides how
    /// rows are read, so a log written for a different battery still parses as
    /// long as it is internally consistent.
    pub fn read_all(&self) -> Result<Vec<LogRow>> {
        let Some(content) = read_optional_bytes(&self.path, "reading results history")? else {
            return Ok(Vec::new());
        };

        // Invalid UTF-8 surfaces as a record error, i.e. as a corrupt log
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(content.as_slice());

        let headers = reader
            .headers()
            .map_err(|e| self.corrupt(1, e.to_string()))?
            .clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        let layout =
            HeaderLayout::from_headers(&headers).map_err(|detail| self.corrupt(1, detail))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| {
                let line = e.position().map_or(0, csv::Position::line);
                self.corrupt(line, e.to_string())
            })?;
            let line = record.position().map_or(0, csv::Position::line);
            rows.push(layout.parse_row(&record).map_err(|detail| self.corrupt(line, detail))?);
        }

        log::debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    /// The log exactly as stored, `None` when it does not exist
    pub fn raw_contents(&self) -> Result<Option<Vec<u8>>> {
        read_optional_bytes(&self.path, "exporting results history")
    }

    /// Copy the log verbatim to `dest`, returning the bytes copied
    ///
    /// Returns `Ok(None)` when there is no log to copy.
    pub fn export_to(&self, dest: &Path) -> Result<Option<u64>> {
        if self.state() == LogState::Absent {
            return Ok(None);
        }
        fs::copy(&self.path, dest)
            .map(Some)
            .map_err(|source| CogScoreError::Io {
                path: dest.to_path_buf(),
                source,
            })
    }

    fn corrupt(&self, line: u64, detail: impl Into<String>) -> CogScoreError {
        CogScoreError::LogCorrupt {
            path: self.path.clone(),
            line,
            detail: detail.into(),
        }
    }
}

/// Storage that can be cut back to an earlier length
trait Truncate {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for fs::File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write `buffer` completely or restore `out` to `original_len`
fn commit<W: Write + Truncate>(out: &mut W, original_len: u64, buffer: &[u8]) -> io::Result<()> {
    let result = out.write_all(buffer).and_then(|()| out.flush());
    if result.is_err()
        && let Err(rollback) = out.truncate_to(original_len)
    {
        log::error!("Failed to remove partially written row: {rollback}");
    }
    result
}

fn ends_with_newline(file: &mut fs::File, len: u64) -> io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Test order recovered from a log header
struct HeaderLayout {
    tests: Vec<String>,
}

impl HeaderLayout {
    fn from_headers(headers: &csv::StringRecord) -> std::result::Result<Self, String> {
        let columns: Vec<&str> = headers.iter().collect();
        if columns.len() < 3 {
            return Err(format!("header has {} columns, expected at least 3", columns.len()));
        }

        let leading = [NAME_COLUMN, AGE_COLUMN, TIMESTAMP_COLUMN];
        let is_current = columns[..3] == leading;
        let is_legacy = columns[..3] == LEGACY_LEADING_COLUMNS;
        if !is_current && !is_legacy {
            return Err(format!(
                "header starts with [{}], expected [{}]",
                columns[..3].join(", "),
                leading.join(", ")
            ));
        }

        let score_columns = &columns[3..];
        if score_columns.len() % 2 != 0 {
            return Err("score columns are not in raw/Z pairs".to_string());
        }

        let tests = score_columns
            .chunks(2)
            .map(|pair| match (test_of_raw_column(pair[0]), test_of_z_column(pair[1])) {
                (Some(raw), Some(z)) if raw == z => Ok(raw.to_string()),
                _ => Err(format!("columns '{}' and '{}' are not a raw/Z pair", pair[0], pair[1])),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { tests })
    }

    fn parse_row(&self, record: &csv::StringRecord) -> std::result::Result<LogRow, String> {
        let field = |idx: usize| record.get(idx).unwrap_or_default();

        let age = field(1)
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid age '{}': {e}", field(1)))?;
        let timestamp = NaiveDateTime::parse_from_str(field(2).trim(), TIMESTAMP_FORMAT)
            .map_err(|e| format!("invalid timestamp '{}': {e}", field(2)))?;

        let scores = self
            .tests
            .iter()
            .enumerate()
            .map(|(i, test)| {
                let raw_field = field(3 + i * 2).trim();
                let z_field = field(4 + i * 2).trim();
                let raw = raw_field
                    .parse::<f64>()
                    .map_err(|e| format!("invalid raw score '{raw_field}' for '{test}': {e}"))?;
                let z = if z_field.is_empty() {
                    None
                } else {
                    Some(
                        z_field
                            .parse::<f64>()
                            .map_err(|e| format!("invalid Z score '{z_field}' for '{test}': {e}"))?,
                    )
                };
                Ok(TestScore::new(test.clone(), raw, z))
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;

        Ok(LogRow {
            name: field(0).to_string(),
            age,
            timestamp,
            scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap()
    }

    fn row(name: &str, minute: u32) -> LogRow {
        LogRow {
            name: name.to_string(),
            age: 30,
            timestamp: at(minute),
            scores: vec![
                TestScore::new("Aprendizaje Serial", 25.0, Some(1.0)),
                TestScore::new("Reconocimiento", 12.0, None),
            ],
        }
    }

    fn log_in(dir: &Path) -> ResultLog {
        ResultLog::new(dir.join("resultados.csv"), ["Aprendizaje Serial", "Reconocimiento"])
    }

    #[test]
    fn test_state_transitions_on_first_append() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(dir.path());
        assert_eq!(log.state(), LogState::Absent);
        assert!(log.read_all().unwrap().is_empty());

        log.append(&row("Ana", 0)).unwrap();
        assert_eq!(log.state(), LogState::Initialized);
    }

    #[test]
    fn test_names_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(dir.path());
        log.append(&row("Pérez, Ana \"Anita\"", 0)).unwrap();

        let content = String::from_utf8(log.raw_contents().unwrap().unwrap()).unwrap();
        assert!(content.contains("\"Pérez, Ana \"\"Anita\"\"\""));
        assert_eq!(log.read_all().unwrap()[0].name, "Pérez, Ana \"Anita\"");
    }

    #[test]
    fn test_rejects_row_for_other_battery() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("log.csv"), ["Reconocimiento"]);
        let err = log.append(&row("Ana", 0)).unwrap_err();
        assert!(matches!(err, CogScoreError::LogSchema { .. }));
        assert_eq!(log.state(), LogState::Absent);
    }

    #[test]
    fn test_reads_legacy_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.csv");
        fs::write(
            &path,
            "Nombre,Edad,Fecha,Reconocimiento - Bruto,Reconocimiento - Z\n\
             Ana,30,2024-03-05 09:00:00,12.0,-0.5\n",
        )
        .unwrap();

        let rows = ResultLog::new(&path, ["Reconocimiento"]).read_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score("Reconocimiento").unwrap().z, Some(-0.5));
    }

    #[test]
    fn test_unpaired_header_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.csv");
        fs::write(&path, "Name,Age,Timestamp,A - Bruto,B - Z\n").unwrap();

        let err = ResultLog::new(&path, ["A"]).read_all().unwrap_err();
        assert!(matches!(err, CogScoreError::LogCorrupt { line: 1, .. }));
    }

    #[test]
    fn test_bad_age_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.csv");
        fs::write(
            &path,
            "Name,Age,Timestamp,A - Bruto,A - Z\nAna,treinta,2024-03-05 09:00:00,1,\n",
        )
        .unwrap();

        let err = ResultLog::new(&path, ["A"]).read_all().unwrap_err();
        match err {
            CogScoreError::LogCorrupt { line, detail, .. } => {
                assert_eq!(line, 2);
                assert!(detail.contains("invalid age"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_export_copies_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(dir.path());
        let dest = dir.path().join("download.csv");
        assert_eq!(log.export_to(&dest).unwrap(), None);

        log.append(&row("Ana", 0)).unwrap();
        let copied = log.export_to(&dest).unwrap().unwrap();
        let original = fs::read(log.path()).unwrap();
        assert_eq!(copied as usize, original.len());
        assert_eq!(fs::read(&dest).unwrap(), original);
    }

    /// Accepts `capacity` bytes in total, then fails like a full disk
    struct ShortDisk {
        data: Vec<u8>,
        capacity: usize,
    }

    impl Write for ShortDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity.saturating_sub(self.data.len());
            if room == 0 {
                return Err(io::Error::other("no space left on device"));
            }
            let n = room.min(buf.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Truncate for ShortDisk {
        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            self.data.truncate(usize::try_from(len).unwrap());
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_leaves_no_partial_row() {
        let existing = b"Name,Age,Timestamp,A - Bruto,A - Z\nAna,30,2024-03-05 09:00:00,1,\n";
        let mut disk = ShortDisk {
            data: existing.to_vec(),
            capacity: existing.len() + 5,
        };

        let err = commit(&mut disk, existing.len() as u64, b"Luis,31,2024-03-05 09:01:00,2,\n")
            .unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");
        assert_eq!(disk.data, existing);
    }

    #[test]
    fn test_commit_writes_whole_buffer() {
        let mut disk = ShortDisk {
            data: b"header\n".to_vec(),
            capacity: 64,
        };
        commit(&mut disk, 7, b"row\n").unwrap();
        assert_eq!(disk.data, b"header\nrow\n");
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.csv");
        fs::write(
            &path,
            b"Name,Age,Timestamp,A - Bruto,A - Z\nJos\xe9,30,2024-03-05 09:00:00,1,\n",
        )
        .unwrap();

        let log = ResultLog::new(&path, ["A"]);
        let err = log.read_all().unwrap_err();
        assert!(matches!(err, CogScoreError::LogCorrupt { line: 2, .. }));

        // The bytes are still exportable as-is
        assert_eq!(log.raw_contents().unwrap().unwrap(), fs::read(&path).unwrap());
    }
}

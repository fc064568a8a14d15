//! Console output utilities
//!
//! Renders scored submissions and the results history for a terminal.

use std::fmt::Write as _;

use crate::models::log_row::{TIMESTAMP_FORMAT, header_for};
use crate::models::{LogRow, TestScore};

/// Shown in place of a standardized score when no norm applies
pub const NO_NORM_WARNING: &str = "no reference for this age or zero standard deviation";

/// Display form of a standardized score
#[must_use]
pub fn format_z(z: Option<f64>) -> String {
    match z {
        Some(z) => format!("{z:.2}"),
        None => format!("⚠ {NO_NORM_WARNING}"),
    }
}

/// Per-test results of one submission
#[must_use]
pub fn render_results(row: &LogRow) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Results for {} (age {}):", row.name, row.age);
    for TestScore { test, raw, z } in &row.scores {
        let _ = writeln!(out, "  {test}: {}  (raw {raw})", format_z(*z));
    }
    out
}

/// Aligned table of the whole history; absent scores render as `-`
#[must_use]
pub fn render_history(rows: &[LogRow]) -> String {
    let Some(first) = rows.first() else {
        return "No saved history yet.\n".to_string();
    };

    let header = header_for(first.test_names());
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                row.name.clone(),
                row.age.to_string(),
                row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ];
            for score in &row.scores {
                cells.push(score.raw.to_string());
                cells.push(score.z.map_or_else(|| "-".to_string(), |z| format!("{z:.2}")));
            }
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for cells in &body {
        push_line(&mut out, cells, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}

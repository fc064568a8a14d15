use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::{CogScoreError, Result};
use crate::models::{MAX_AGE, MIN_AGE};

#[derive(Parser, Debug)]
#[command(
    name = "cogscore",
    version,
    about = "Standardize cognitive test scores against age norms and keep a results log"
)]
pub struct Cli {
    /// TOML configuration with the test battery and file locations
    #[arg(long, global = true, env = "COGSCORE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a patient and append the result to the log
    Submit(SubmitArgs),
    /// Show every saved submission
    History(HistoryArgs),
    /// Copy the results log verbatim
    Export(ExportArgs),
    /// List the configured tests and their reference sources
    Tests,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Patient name
    #[arg(long)]
    pub name: String,

    /// Patient age in years
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_AGE)..=i64::from(MAX_AGE))
    )]
    pub age: u32,

    /// Raw score as "<test name>=<value>", once per test
    #[arg(long = "score", value_name = "TEST=RAW", value_parser = parse_score)]
    pub scores: Vec<(String, f64)>,
}

impl SubmitArgs {
    /// Raw scores keyed by test; a test given twice is rejected
    pub fn score_map(&self) -> Result<HashMap<String, f64>> {
        let mut map = HashMap::with_capacity(self.scores.len());
        for (test, raw) in &self.scores {
            if map.insert(test.clone(), *raw).is_some() {
                return Err(CogScoreError::InvalidSubmission(format!(
                    "score for '{test}' given more than once"
                )));
            }
        }
        Ok(map)
    }
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Print the history as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination file
    #[arg(long)]
    pub out: PathBuf,
}

/// Parse a `<test name>=<raw score>` pair; the last `=` separates the value
pub fn parse_score(raw: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected <test>=<raw score>, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing test name in '{raw}'"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid raw score in '{raw}': {e}"))?;
    Ok((name.to_string(), value))
}

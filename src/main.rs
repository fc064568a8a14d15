use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use cogscore::cli::{Cli, Commands, ExportArgs, HistoryArgs, SubmitArgs};
use cogscore::utils::logging::{render_history, render_results};
use cogscore::{CogScoreError, PatientSubmission, ResultLog, ScoringConfig, ScoringSession};

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ScoringConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ScoringConfig::default(),
    };
    config.validate()?;

    match cli.command {
        Commands::Submit(args) => submit(config, &args),
        Commands::History(args) => history(&config, &args),
        Commands::Export(args) => export(&config, &args),
        Commands::Tests => {
            for test in &config.tests {
                println!("{}\t{}", test.name, config.source_path(test).display());
            }
            Ok(())
        }
    }
}

fn submit(config: ScoringConfig, args: &SubmitArgs) -> Result<()> {
    // Norms must be complete before any submission is accepted
    let session = ScoringSession::open(config).context("Cannot accept submissions")?;

    let submission = PatientSubmission::new(args.name.clone(), args.age, args.score_map()?);
    let row = session
        .submit(&submission)
        .context("Submission was not saved; no row was written")?;

    print!("{}", render_results(&row));
    info!("Results saved to {}", session.log().path().display());
    Ok(())
}

fn history(config: &ScoringConfig, args: &HistoryArgs) -> Result<()> {
    // History does not need the norms, only the log
    let log = ResultLog::from_config(config);
    let rows = match log.read_all() {
        Ok(rows) => rows,
        Err(e @ CogScoreError::LogCorrupt { .. }) => {
            warn!("{e}. Open the file and check its rows manually.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render_history(&rows));
    }
    Ok(())
}

fn export(config: &ScoringConfig, args: &ExportArgs) -> Result<()> {
    let log = ResultLog::from_config(config);
    match log.export_to(&args.out)? {
        Some(bytes) => info!("Exported {bytes} bytes to {}", args.out.display()),
        None => warn!("No saved history yet: {}", log.path().display()),
    }
    Ok(())
}

//! # music-insights
//!
//! Command-line front end: parses arguments, initialises logging and routes
//! each subcommand to the library.
//!
//! ## Usage
//!
//! ```bash
//! # Create a sample dataset
//! music-insights generate --seed 42 data
//!
//! # Analyse it
//! music-insights run --logs data/listening_logs.csv --songs data/songs_metadata.csv --output out
//! ```

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use log::{info, warn};
use music_insights::cli::{self, Args, Command};
use music_insights::completion;
use music_insights::config::{AnalysisConfig, RuntimeConfig};
use music_insights::generate::{self, GeneratorConfig};
use music_insights::pipeline::{self, RunSummary};

/// Main entry point.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug music-insights run` - Enable debug logging
/// - `RUST_LOG=music_insights::loader=trace music-insights run` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Command::Run { logs, songs, output, config, only, sequential, summary } => {
            let analysis = AnalysisConfig::resolve(config.as_deref())?;
            let mut runtime = RuntimeConfig::with_paths(logs, songs, output);
            if !only.is_empty() {
                runtime.tasks = only;
                runtime.tasks.sort();
                runtime.tasks.dedup();
            }
            runtime.parallel = !sequential;

            let report = pipeline::run(&runtime, &analysis)?;
            print_summary(&report);
            if let Some(path) = summary {
                report.save_json(&path)?;
                info!("Run summary written to {}", path.display());
            }

            let failed = report.failures().len();
            if failed > 0 {
                bail!("{failed} of {} tasks failed", report.reports.len());
            }
        }
        Command::Generate { output_dir, records, users, songs, forced_plays, seed } => {
            let config = GeneratorConfig { users, songs, records, forced_plays, seed };
            if seed.is_none() {
                warn!("No --seed given, output will not be reproducible");
            }
            let (events, catalog) = generate::generate(&config)?;
            let (logs_path, songs_path) = generate::write_dataset(&output_dir, &events, &catalog)?;
            println!("{}", logs_path.display());
            println!("{}", songs_path.display());
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{} events, {} songs, {} joined -> {}",
        summary.events,
        summary.songs,
        summary.joined,
        summary.output_dir.display()
    );
    for report in &summary.reports {
        match (&report.path, &report.error) {
            (Some(path), None) => println!("  {:<24} {:>6} rows  {}", report.task, report.rows, path.display()),
            (_, Some(error)) => println!("  {:<24} FAILED  {error}", report.task),
            (None, None) => println!("  {:<24} skipped", report.task),
        }
    }
}

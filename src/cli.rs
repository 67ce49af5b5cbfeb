//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for music-insights using
//! Clap derive macros.
//!
//! ## Commands
//!
//! - `run`: Load the two inputs, run the analyses and write one CSV per task
//! - `generate`: Write a synthetic pair of input files
//! - `completion`: Print a shell completion script
//!
//! ## Examples
//!
//! ```bash
//! music-insights generate --seed 42 data/
//! music-insights run --logs data/listening_logs.csv --songs data/songs_metadata.csv
//! music-insights run --only night-owls --only genre-loyalty --sequential
//! ```

use crate::analysis::Task;
use crate::config::{DEFAULT_LOGS_PATH, DEFAULT_OUTPUT_DIR, DEFAULT_SONGS_PATH};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// All functionality is reached through a subcommand.
#[derive(Parser, Debug)]
#[command(name = "music-insights")]
#[command(about = "Batch analytics over music listening logs")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the analyses and write their tables
    ///
    /// Reads the listening logs and the song catalog, then writes
    /// `<output>/<task>.csv` for every selected task. A task that fails is
    /// reported and the others still complete; the exit status is non-zero
    /// if any task failed.
    Run {
        /// Listening log CSV (user_id, song_id, timestamp, duration_sec)
        #[arg(long, env = "MUSIC_INSIGHTS_LOGS", default_value = DEFAULT_LOGS_PATH)]
        logs: PathBuf,

        /// Song metadata CSV (song_id, title, artist, genre, mood)
        #[arg(long, env = "MUSIC_INSIGHTS_SONGS", default_value = DEFAULT_SONGS_PATH)]
        songs: PathBuf,

        /// Directory receiving the output tables
        #[arg(short, long, env = "MUSIC_INSIGHTS_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Analysis config file (JSON)
        ///
        /// Defaults to music-insights/config.json in the platform config
        /// directory when that file exists.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Run only these tasks (repeatable)
        #[arg(long, value_enum)]
        only: Vec<Task>,

        /// Run tasks one after another instead of in parallel
        #[arg(long)]
        sequential: bool,

        /// Also write the run summary as JSON to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Generate a synthetic dataset
    ///
    /// Writes listening_logs.csv and songs_metadata.csv into the target
    /// directory. The first plays are fixed so that user_1 and user_2 are
    /// loyal to a single song.
    Generate {
        /// Target directory
        #[arg(default_value = ".", value_hint = clap::ValueHint::DirPath)]
        output_dir: PathBuf,

        /// Number of listening events
        #[arg(long, default_value_t = 1000)]
        records: usize,

        /// Number of distinct users
        #[arg(long, default_value_t = 99)]
        users: usize,

        /// Number of catalog songs
        #[arg(long, default_value_t = 49)]
        songs: usize,

        /// Fixed plays for each of the two loyal listeners
        #[arg(long, default_value_t = 50)]
        forced_plays: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate shell completions
    ///
    /// Prints a completion script for the given shell to stdout.
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

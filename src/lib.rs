//! Batch analytics over music listening logs.
//!
//! Two CSV relations, listening events and a song catalog, are loaded once
//! and answered six questions: favorite genre per user, average listen time
//! per song, the current week's top songs, happy-song recommendations for
//! sad listeners, genre loyalty scores and night-owl users.
//!
//! Core modules:
//! - [`loader`] - CSV parsing into typed relations
//! - [`relational`] - joins, group-by aggregation, window ranking
//! - [`analysis`] - the six analysis stages
//! - [`output`] - one CSV table per stage
//! - [`pipeline`] - load, run and persist with per-stage failure isolation
//!
//! ### Supporting Modules
//!
//! - [`config`] - Input/output locations and analysis thresholds
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`generate`] - Synthetic dataset generation
//! - [`schema`] / [`error`] - Row types and input errors
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use music_insights::config::{AnalysisConfig, RuntimeConfig};
//! use music_insights::pipeline;
//!
//! let runtime = RuntimeConfig::with_paths(
//!     "listening_logs.csv".into(),
//!     "songs_metadata.csv".into(),
//!     "output".into(),
//! );
//! let summary = pipeline::run(&runtime, &AnalysisConfig::default())?;
//! for report in &summary.reports {
//!     println!("{}: {} rows", report.task, report.rows);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Stages can also be run directly over in-memory relations:
//!
//! ```
//! use music_insights::analysis::{run_task, AnalysisInput, Task, TaskOutput};
//! use music_insights::config::AnalysisConfig;
//! use music_insights::loader::{parse_listening_events, parse_songs};
//! use std::path::Path;
//!
//! let logs = "user_id,song_id,timestamp,duration_sec\nu1,s1,2024-04-10 02:30:00,200\n";
//! let songs = "song_id,title,artist,genre,mood\ns1,Intro,Band,Jazz,Chill\n";
//! let events = parse_listening_events(logs.as_bytes(), Path::new("logs"))?;
//! let songs = parse_songs(songs.as_bytes(), Path::new("songs"))?;
//!
//! let input = AnalysisInput::new(&events, &songs);
//! let output = run_task(Task::NightOwls, &input, &AnalysisConfig::default());
//! assert_eq!(output.len(), 1);
//! assert!(matches!(output, TaskOutput::NightOwls(_)));
//! # Ok::<(), music_insights::error::InputError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod generate;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod relational;
pub mod schema;

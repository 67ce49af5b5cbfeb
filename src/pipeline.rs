//! # Pipeline Driver
//!
//! Loads both relations, runs the selected analysis stages and persists one
//! table per stage.
//!
//! Input problems abort the run before anything is written. After that,
//! each stage together with its output file is its own failure domain: a
//! stage that fails or panics is recorded in the [`RunSummary`] and the remaining
//! stages still run and write their tables.

use crate::analysis::{self, AnalysisInput, Task, TaskOutput};
use crate::config::{AnalysisConfig, RuntimeConfig};
use crate::loader;
use crate::schema::{ListeningEvent, Song};
use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of a single stage.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task: Task,
    /// Rows written; 0 on failure
    pub rows: usize,
    pub path: Option<PathBuf>,
    pub error: Option<String>,
    pub elapsed_ms: u128,
}

impl TaskReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-stage outcomes of one run, in task order.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub events: usize,
    pub songs: usize,
    pub joined: usize,
    pub reports: Vec<TaskReport>,
}

impl RunSummary {
    #[must_use]
    pub fn failures(&self) -> Vec<&TaskReport> {
        self.reports.iter().filter(|report| !report.succeeded()).collect()
    }

    /// Write the summary as pretty JSON.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or written.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create summary file {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("Failed to write summary file {}", path.display()))?;
        Ok(())
    }
}

/// Load the inputs named in `runtime` and run every configured stage.
///
/// # Errors
///
/// Returns an error only for fatal conditions: unreadable or malformed
/// inputs, or an output directory that cannot be created. Stage failures are
/// reported inside the [`RunSummary`].
pub fn run(runtime: &RuntimeConfig, config: &AnalysisConfig) -> Result<RunSummary> {
    let events = loader::load_listening_events(&runtime.logs_path)
        .context("Failed to load listening logs")?;
    let songs = loader::load_songs(&runtime.songs_path).context("Failed to load song metadata")?;

    analyze(&events, &songs, runtime, config)
}

/// Run the configured stages over already loaded relations.
///
/// # Errors
///
/// See [`run`].
pub fn analyze(
    events: &[ListeningEvent],
    songs: &[Song],
    runtime: &RuntimeConfig,
    config: &AnalysisConfig,
) -> Result<RunSummary> {
    let output_dir = runtime.absolute_output_dir()?;
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let input = AnalysisInput::new(events, songs);
    info!(
        "Running {} analyses over {} events ({} joined) into {}",
        runtime.tasks.len(),
        events.len(),
        input.joined.len(),
        output_dir.display()
    );

    let execute = |&task: &Task| run_stage(task, &output_dir, || analysis::run_task(task, &input, config));
    let reports: Vec<TaskReport> = if runtime.parallel {
        runtime.tasks.par_iter().map(execute).collect()
    } else {
        runtime.tasks.iter().map(execute).collect()
    };

    Ok(RunSummary {
        output_dir,
        events: events.len(),
        songs: songs.len(),
        joined: input.joined.len(),
        reports,
    })
}

fn run_stage(task: Task, output_dir: &Path, compute: impl FnOnce() -> TaskOutput) -> TaskReport {
    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(compute))
        .map_err(|payload| anyhow!("stage panicked: {}", panic_message(payload.as_ref())))
        .and_then(|output| {
            let rows = output.len();
            output.save(output_dir).map(|path| (rows, path))
        });

    match outcome {
        Ok((rows, path)) => {
            info!("{task}: {rows} rows -> {}", path.display());
            TaskReport {
                task,
                rows,
                path: Some(path),
                error: None,
                elapsed_ms: started.elapsed().as_millis(),
            }
        }
        Err(e) => {
            error!("{task}: {e:#}");
            TaskReport {
                task,
                rows: 0,
                path: None,
                error: Some(format!("{e:#}")),
                elapsed_ms: started.elapsed().as_millis(),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

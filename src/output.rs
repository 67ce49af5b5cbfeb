//! # Output Writer
//!
//! Every task writes one CSV table, `<output_dir>/<task output name>.csv`,
//! with a header row even when the result is empty. Existing files are
//! replaced atomically: a table is staged in a temporary file beside its
//! target and renamed into place once complete.

use crate::analysis::{
    FavoriteGenre, LoyaltyScore, NightOwl, Recommendation, SongListenTime, Task, TaskOutput, WeeklyTopSong,
};
use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A row type with a fixed column layout.
pub trait OutputRow: Serialize {
    /// Column names in serialization order.
    const HEADER: &'static [&'static str];
}

impl OutputRow for FavoriteGenre {
    const HEADER: &'static [&'static str] = &["user_id", "genre", "count"];
}

impl OutputRow for SongListenTime {
    const HEADER: &'static [&'static str] = &["song_id", "avg_duration_sec"];
}

impl OutputRow for WeeklyTopSong {
    const HEADER: &'static [&'static str] = &["song_id", "title", "artist", "genre", "mood", "play_count"];
}

impl OutputRow for Recommendation {
    const HEADER: &'static [&'static str] = &["user_id", "song_id", "title", "artist"];
}

impl OutputRow for LoyaltyScore {
    const HEADER: &'static [&'static str] = &["user_id", "loyalty_score"];
}

impl OutputRow for NightOwl {
    const HEADER: &'static [&'static str] = &["user_id"];
}

/// Path of a task's table inside `output_dir`.
#[must_use]
pub fn output_path(output_dir: &Path, task: Task) -> PathBuf {
    output_dir.join(format!("{}.csv", task.output_name()))
}

/// Write header and rows as CSV.
///
/// # Errors
///
/// Fails on any I/O or serialization error.
pub fn write_rows<W: io::Write, R: OutputRow>(writer: W, rows: &[R]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(R::HEADER).context("Failed to write header row")?;
    for row in rows {
        csv.serialize(row).context("Failed to write result row")?;
    }
    csv.flush().context("Failed to flush output")?;
    Ok(())
}

impl TaskOutput {
    /// Serialize the rows to `writer` as CSV.
    ///
    /// # Errors
    ///
    /// See [`write_rows`].
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        match self {
            Self::FavoriteGenre(rows) => write_rows(writer, rows),
            Self::AvgListenTime(rows) => write_rows(writer, rows),
            Self::TopSongsThisWeek(rows) => write_rows(writer, rows),
            Self::HappyRecommendations(rows) => write_rows(writer, rows),
            Self::GenreLoyalty(rows) => write_rows(writer, rows),
            Self::NightOwls(rows) => write_rows(writer, rows),
        }
    }

    /// Write the task's table into `output_dir`, replacing any previous run.
    ///
    /// The table only appears at its final path once fully written.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or written.
    pub fn save(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_path(output_dir, self.task());
        write_atomically(&path, |file| self.write_csv(file))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {} rows to {}", self.len(), path.display());
        Ok(path)
    }
}

/// Stage `write` into a temporary file next to `path`, then rename it over
/// `path`. On error the temporary file is removed and `path` is untouched.
///
/// # Errors
///
/// Propagates errors from `write`, temp file creation and the final rename.
pub fn write_atomically(path: &Path, write: impl FnOnce(&mut File) -> Result<()>) -> Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    write(staged.as_file_mut())?;
    staged
        .persist(path)
        .with_context(|| format!("Failed to move table into place at {}", path.display()))?;
    Ok(())
}

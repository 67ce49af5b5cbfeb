//! # Schema Loader
//!
//! Parses the two CSV inputs into typed relations.
//!
//! Both files must carry a header row. Column order is free and extra
//! columns are ignored, but every required column must be present. Any
//! row that fails to decode aborts the load with an [`InputError`] naming
//! the file and line; nothing is ever coerced to a default.

use crate::error::InputError;
use crate::schema::{ListeningEvent, Song, LOG_COLUMNS, SONG_COLUMNS, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use csv::{Position, StringRecord, Trim};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::io;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct LogRecord {
    user_id: String,
    song_id: String,
    timestamp: String,
    duration_sec: i64,
}

#[derive(Debug, Deserialize)]
struct SongRecord {
    song_id: String,
    title: String,
    artist: String,
    genre: String,
    mood: String,
}

/// Load the listening log relation from a CSV file.
///
/// # Errors
///
/// Returns an [`InputError`] if the file cannot be read, a required column
/// is missing, or any row is malformed.
pub fn load_listening_events(path: &Path) -> Result<Vec<ListeningEvent>, InputError> {
    let reader = csv_reader()
        .from_path(path)
        .map_err(|source| InputError::Unreadable { path: path.to_path_buf(), source })?;
    let events = read_events(reader, path)?;
    info!("Loaded {} listening events from {}", events.len(), path.display());
    Ok(events)
}

/// Load the song metadata relation from a CSV file.
///
/// Duplicate `song_id`s are tolerated but logged; the join emits one row per
/// match for them.
///
/// # Errors
///
/// Same conditions as [`load_listening_events`].
pub fn load_songs(path: &Path) -> Result<Vec<Song>, InputError> {
    let reader = csv_reader()
        .from_path(path)
        .map_err(|source| InputError::Unreadable { path: path.to_path_buf(), source })?;
    let songs = read_songs(reader, path)?;
    info!("Loaded {} songs from {}", songs.len(), path.display());
    Ok(songs)
}

/// Parse listening events from any reader. `source` is only used in errors.
///
/// # Errors
///
/// See [`load_listening_events`].
pub fn parse_listening_events<R: io::Read>(
    input: R,
    source: &Path,
) -> Result<Vec<ListeningEvent>, InputError> {
    read_events(csv_reader().from_reader(input), source)
}

/// Parse song metadata from any reader. `source` is only used in errors.
///
/// # Errors
///
/// See [`load_songs`].
pub fn parse_songs<R: io::Read>(input: R, source: &Path) -> Result<Vec<Song>, InputError> {
    read_songs(csv_reader().from_reader(input), source)
}

fn csv_reader() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).trim(Trim::All);
    builder
}

fn read_events<R: io::Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
) -> Result<Vec<ListeningEvent>, InputError> {
    let headers = checked_headers(&mut reader, path, &LOG_COLUMNS)?;

    let mut events = Vec::new();
    for row in reader.records() {
        let (record, line) = located(row, path)?;
        let raw: LogRecord = record
            .deserialize(Some(&headers))
            .map_err(|source| InputError::MalformedRow { path: path.to_path_buf(), line, source })?;

        require(&raw.user_id, "user_id", path, line)?;
        require(&raw.song_id, "song_id", path, line)?;
        let timestamp = NaiveDateTime::parse_from_str(&raw.timestamp, TIMESTAMP_FORMAT)
            .map_err(|source| InputError::Timestamp {
                path: path.to_path_buf(),
                line,
                value: raw.timestamp.clone(),
                source,
            })?;

        events.push(ListeningEvent {
            user_id: raw.user_id,
            song_id: raw.song_id,
            timestamp,
            duration_sec: raw.duration_sec,
        });
    }

    Ok(events)
}

fn read_songs<R: io::Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Vec<Song>, InputError> {
    let headers = checked_headers(&mut reader, path, &SONG_COLUMNS)?;

    let mut songs = Vec::new();
    let mut seen = HashSet::new();
    for row in reader.records() {
        let (record, line) = located(row, path)?;
        let raw: SongRecord = record
            .deserialize(Some(&headers))
            .map_err(|source| InputError::MalformedRow { path: path.to_path_buf(), line, source })?;

        require(&raw.song_id, "song_id", path, line)?;
        if !seen.insert(raw.song_id.clone()) {
            warn!(
                "{}:{line}: duplicate song_id '{}'; every copy will join",
                path.display(),
                raw.song_id
            );
        }

        songs.push(Song {
            song_id: raw.song_id,
            title: raw.title,
            artist: raw.artist,
            genre: raw.genre,
            mood: raw.mood,
        });
    }

    Ok(songs)
}

fn checked_headers<R: io::Read>(
    reader: &mut csv::Reader<R>,
    path: &Path,
    required: &[&'static str],
) -> Result<StringRecord, InputError> {
    let headers = reader
        .headers()
        .map_err(|source| InputError::Unreadable { path: path.to_path_buf(), source })?
        .clone();

    if let Some(&column) = required.iter().find(|column| !headers.iter().any(|h| h == **column)) {
        return Err(InputError::MissingColumn { path: path.to_path_buf(), column });
    }

    debug!("{} header: {:?}", path.display(), headers);
    Ok(headers)
}

fn located(
    row: Result<StringRecord, csv::Error>,
    path: &Path,
) -> Result<(StringRecord, u64), InputError> {
    match row {
        Ok(record) => {
            let line = record.position().map_or(0, Position::line);
            Ok((record, line))
        }
        Err(source) => {
            let line = source.position().map_or(0, Position::line);
            Err(InputError::MalformedRow { path: path.to_path_buf(), line, source })
        }
    }
}

fn require(value: &str, column: &'static str, path: &Path, line: u64) -> Result<(), InputError> {
    if value.is_empty() {
        return Err(InputError::EmptyField { path: path.to_path_buf(), line, column });
    }
    Ok(())
}

//! # Synthetic Dataset Generator
//!
//! Produces a random but well-formed pair of inputs for trying out the
//! analyses without real data.
//!
//! The first `forced_plays` records belong to `user_1` playing `song_1`, the
//! next `forced_plays` to `user_2` playing `song_2`, so that at least two
//! listeners end up genre-loyal. Everything else is drawn uniformly:
//! timestamps at minute resolution across April 2024, durations in
//! `[60, 300)` seconds, genres and moods from fixed vocabularies.

use crate::schema::{ListeningEvent, Song, TIMESTAMP_FORMAT};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

pub const GENRES: [&str; 4] = ["Pop", "Rock", "Jazz", "Classical"];
pub const MOODS: [&str; 4] = ["Happy", "Sad", "Energetic", "Chill"];

/// File name of the generated listening logs.
pub const LOGS_FILE: &str = "listening_logs.csv";
/// File name of the generated song catalog.
pub const SONGS_FILE: &str = "songs_metadata.csv";

/// Minutes between 2024-04-01 00:00 and 2024-04-30 00:00.
const SPAN_MINUTES: i64 = 29 * 24 * 60;

const MIN_DURATION_SEC: i64 = 60;
const MAX_DURATION_SEC: i64 = 300;

/// Shape of the generated dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub users: usize,
    pub songs: usize,
    pub records: usize,
    /// Fixed plays per loyal listener at the head of the logs
    pub forced_plays: usize,
    /// Reproducible output when set
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            users: 99,
            songs: 49,
            records: 1000,
            forced_plays: 50,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// # Errors
    ///
    /// Fails when the forced plays cannot be expressed: they need two users,
    /// two songs and room for `2 * forced_plays` records.
    pub fn validate(&self) -> Result<()> {
        if self.users == 0 || self.songs == 0 {
            bail!("at least one user and one song are required");
        }
        if self.forced_plays > 0 {
            if self.users < 2 || self.songs < 2 {
                bail!("forced plays need at least two users and two songs");
            }
            if self.records < 2 * self.forced_plays {
                bail!(
                    "{} records cannot hold {} forced plays per loyal listener",
                    self.records,
                    self.forced_plays
                );
            }
        }
        Ok(())
    }
}

fn window_start() -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2024, 4, 1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("invalid generator start date"))
}

fn pick<'a, R: Rng>(rng: &mut R, choices: &[&'a str]) -> &'a str {
    choices[rng.gen_range(0..choices.len())]
}

/// Generate logs and catalog in memory.
///
/// # Errors
///
/// Propagates [`GeneratorConfig::validate`].
pub fn generate(config: &GeneratorConfig) -> Result<(Vec<ListeningEvent>, Vec<Song>)> {
    config.validate()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let start = window_start()?;

    let events: Vec<ListeningEvent> = (0..config.records)
        .map(|i| {
            let (user, song) = if i < config.forced_plays {
                (1, 1)
            } else if i < 2 * config.forced_plays {
                (2, 2)
            } else {
                (rng.gen_range(1..=config.users), rng.gen_range(1..=config.songs))
            };
            ListeningEvent {
                user_id: format!("user_{user}"),
                song_id: format!("song_{song}"),
                timestamp: start + Duration::minutes(rng.gen_range(0..=SPAN_MINUTES)),
                duration_sec: rng.gen_range(MIN_DURATION_SEC..MAX_DURATION_SEC),
            }
        })
        .collect();

    let songs: Vec<Song> = (1..=config.songs)
        .map(|i| Song {
            song_id: format!("song_{i}"),
            title: format!("Title_{i}"),
            artist: format!("Artist_{i}"),
            genre: pick(&mut rng, &GENRES).to_string(),
            mood: pick(&mut rng, &MOODS).to_string(),
        })
        .collect();

    debug!(
        "Generated {} records for {} users over {} songs",
        config.records, config.users, config.songs
    );
    Ok((events, songs))
}

/// Write both relations as CSV into `dir`, creating it if needed.
///
/// Returns the paths of the logs and the catalog.
///
/// # Errors
///
/// Fails if the directory or either file cannot be written.
pub fn write_dataset(dir: &Path, events: &[ListeningEvent], songs: &[Song]) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let logs_path = dir.join(LOGS_FILE);
    let songs_path = dir.join(SONGS_FILE);

    let mut logs = csv::Writer::from_path(&logs_path)
        .with_context(|| format!("Failed to create {}", logs_path.display()))?;
    logs.write_record(crate::schema::LOG_COLUMNS)?;
    for event in events {
        let timestamp = event.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let duration = event.duration_sec.to_string();
        logs.write_record([
            event.user_id.as_str(),
            event.song_id.as_str(),
            timestamp.as_str(),
            duration.as_str(),
        ])?;
    }
    logs.flush()?;

    let mut catalog = csv::Writer::from_path(&songs_path)
        .with_context(|| format!("Failed to create {}", songs_path.display()))?;
    catalog.write_record(crate::schema::SONG_COLUMNS)?;
    for song in songs {
        catalog.write_record([&song.song_id, &song.title, &song.artist, &song.genre, &song.mood])?;
    }
    catalog.flush()?;

    info!(
        "Wrote {} listening events to {} and {} songs to {}",
        events.len(),
        logs_path.display(),
        songs.len(),
        songs_path.display()
    );
    Ok((logs_path, songs_path))
}

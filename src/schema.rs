//! # Relation Schemas
//!
//! Typed rows for the two input relations and the derived joined event.
//!
//! ## Relations
//!
//! - [`ListeningEvent`] - one row per play from `listening_logs`
//! - [`Song`] - one catalog entry from `songs_metadata`
//! - [`JoinedEvent`] - a play paired with the song it references
//!
//! Both input relations are read once and never mutated; every analysis
//! stage borrows from them.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Timestamp layout used by the listening logs, e.g. `2024-04-12 02:15:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Required header columns of the listening log input.
pub const LOG_COLUMNS: [&str; 4] = ["user_id", "song_id", "timestamp", "duration_sec"];

/// Required header columns of the song metadata input.
pub const SONG_COLUMNS: [&str; 5] = ["song_id", "title", "artist", "genre", "mood"];

/// A single play of a song by a user.
///
/// Duplicate events are valid; each one counts as a separate play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListeningEvent {
    pub user_id: String,
    /// Foreign key into [`Song::song_id`]. May dangle.
    pub song_id: String,
    /// Naive local time; no timezone conversion is ever applied.
    pub timestamp: NaiveDateTime,
    pub duration_sec: i64,
}

impl ListeningEvent {
    /// ISO week-year and week number of the play.
    ///
    /// The week-year is used rather than the calendar year so that the days
    /// around New Year fall into a single, well-ordered week.
    #[must_use]
    pub fn iso_week(&self) -> (i32, u32) {
        let week = self.timestamp.iso_week();
        (week.year(), week.week())
    }

    /// Hour of day, 0-23.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// A catalog entry. `song_id` is expected to be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub mood: String,
}

/// A listening event enriched with its song's metadata.
///
/// Borrowed from the loaded relations, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct JoinedEvent<'a> {
    pub event: &'a ListeningEvent,
    pub song: &'a Song,
}

impl<'a> JoinedEvent<'a> {
    #[must_use]
    pub fn user_id(&self) -> &'a str {
        &self.event.user_id
    }

    #[must_use]
    pub fn song_id(&self) -> &'a str {
        &self.event.song_id
    }

    #[must_use]
    pub fn genre(&self) -> &'a str {
        &self.song.genre
    }

    #[must_use]
    pub fn mood(&self) -> &'a str {
        &self.song.mood
    }
}

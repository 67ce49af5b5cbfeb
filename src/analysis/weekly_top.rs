//! Most played songs of "this week".
//!
//! "This week" is the latest ISO week that has any play in the logs, not the
//! wall-clock week. Plays in that week are counted per song, joined with the
//! catalog for display fields, and the top N by play count are kept. Equal
//! counts are ordered by `song_id`.

use crate::relational::{group_aggregate, inner_join, top_n, Count, Max, SortOrder};
use crate::schema::{ListeningEvent, Song};
use log::debug;
use serde::Serialize;
use std::cmp::Reverse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyTopSong {
    pub song_id: String,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub mood: String,
    pub play_count: u64,
}

/// Latest `(ISO week-year, week)` with at least one play.
#[must_use]
pub fn current_week(events: &[ListeningEvent]) -> Option<(i32, u32)> {
    group_aggregate(events, |_| (), Max(ListeningEvent::iso_week)).remove(&())
}

/// Up to `limit` songs, most played first.
#[must_use]
pub fn top_songs_this_week(events: &[ListeningEvent], songs: &[Song], limit: usize) -> Vec<WeeklyTopSong> {
    let Some(week) = current_week(events) else {
        return Vec::new();
    };
    debug!("Current week is {}-W{:02}", week.0, week.1);

    let this_week: Vec<&ListeningEvent> = events.iter().filter(|e| e.iso_week() == week).collect();
    let play_counts: Vec<(&str, u64)> = group_aggregate(&this_week, |e| e.song_id.as_str(), Count)
        .into_iter()
        .collect();

    let charted = inner_join(
        &play_counts,
        songs,
        |&(song_id, _)| song_id,
        |song| song.song_id.as_str(),
        |&(_, play_count), song| (song, play_count),
    );

    top_n(
        charted,
        |&(song, play_count)| (play_count, Reverse(song.song_id.as_str())),
        SortOrder::Descending,
        limit,
    )
    .into_iter()
    .map(|(song, play_count)| WeeklyTopSong {
        song_id: song.song_id.clone(),
        title: song.title.clone(),
        artist: song.artist.clone(),
        genre: song.genre.clone(),
        mood: song.mood.clone(),
        play_count,
    })
    .collect()
}

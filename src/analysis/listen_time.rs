//! Average listen duration per song, straight from the raw logs.
//!
//! No metadata is needed, so plays of songs missing from the catalog still
//! count here.

use crate::relational::{par_group_aggregate, Average};
use crate::schema::ListeningEvent;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongListenTime {
    pub song_id: String,
    pub avg_duration_sec: f64,
}

/// One row per distinct `song_id` in the logs, ordered by `song_id`.
#[must_use]
pub fn average_listen_time(events: &[ListeningEvent]) -> Vec<SongListenTime> {
    par_group_aggregate(
        events,
        |e| e.song_id.as_str(),
        Average(|e: &ListeningEvent| e.duration_sec),
    )
    .into_iter()
    .map(|(song_id, avg_duration_sec)| SongListenTime {
        song_id: song_id.to_string(),
        avg_duration_sec,
    })
    .collect()
}

//! # Mood-Based Recommendations
//!
//! Listeners whose joined plays are mostly sad get a few happy songs they
//! have not played yet.
//!
//! 1. Per user, total joined plays and sad plays (0 when there are none);
//!    users whose sad ratio is strictly above the threshold qualify.
//! 2. Per qualifying user, the set of songs already played (raw logs).
//! 3. Every qualifying user is paired with every happy song, skipping songs
//!    the user already played.
//! 4. Remaining candidates are ranked per user by `song_id` and the first
//!    few kept.

use super::{ratio, AnalysisInput};
use crate::config::AnalysisConfig;
use crate::relational::{
    cross_join_filter_map, group_aggregate, inner_join, left_join, top_n_within, Count, Distinct, SortOrder,
};
use crate::schema::{JoinedEvent, ListeningEvent, Song};
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub user_id: String,
    pub song_id: String,
    pub title: String,
    pub artist: String,
}

/// Sad-play share of one listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodProfile<'a> {
    pub user_id: &'a str,
    pub total: u64,
    pub sad: u64,
}

impl MoodProfile<'_> {
    /// `sad / total`, `None` for a listener without joined plays.
    #[must_use]
    pub fn sad_ratio(&self) -> Option<f64> {
        ratio(self.sad, self.total)
    }
}

/// Mood profile of every user with at least one joined play, by `user_id`.
#[must_use]
pub fn mood_profiles<'a>(joined: &[JoinedEvent<'a>], sad_mood: &str) -> Vec<MoodProfile<'a>> {
    let totals: Vec<(&'a str, u64)> = group_aggregate(joined, |e| e.user_id(), Count)
        .into_iter()
        .collect();

    let sad_plays: Vec<JoinedEvent<'a>> = joined.iter().filter(|e| e.mood() == sad_mood).copied().collect();
    let sad_counts: Vec<(&'a str, u64)> = group_aggregate(&sad_plays, |e| e.user_id(), Count)
        .into_iter()
        .collect();

    left_join(
        &totals,
        &sad_counts,
        |&(user, _)| user,
        |&(user, _)| user,
        |&(user_id, total), sad| MoodProfile {
            user_id,
            total,
            sad: sad.map_or(0, |&(_, count)| count),
        },
    )
}

/// Up to `config.recommendations_per_user` happy songs per sad-leaning user.
#[must_use]
pub fn happy_recommendations(input: &AnalysisInput<'_>, config: &AnalysisConfig) -> Vec<Recommendation> {
    let sad_listeners: Vec<&str> = mood_profiles(&input.joined, &config.sad_mood)
        .into_iter()
        .filter(|profile| profile.sad_ratio().is_some_and(|r| r > config.sad_ratio_threshold))
        .map(|profile| profile.user_id)
        .collect();
    debug!("{} listeners qualify for happy recommendations", sad_listeners.len());
    if sad_listeners.is_empty() {
        return Vec::new();
    }

    let played: Vec<(&str, BTreeSet<String>)> = group_aggregate(
        input.events,
        |e| e.user_id.as_str(),
        Distinct(|e: &ListeningEvent| e.song_id.clone()),
    )
    .into_iter()
    .collect();

    let listeners = inner_join(
        &sad_listeners,
        &played,
        |&user| user,
        |(user, _)| *user,
        |&user, (_, songs)| (user, songs),
    );

    let happy_songs: Vec<&Song> = input.songs.iter().filter(|s| s.mood == config.happy_mood).collect();

    let candidates: Vec<(&str, &Song)> =
        cross_join_filter_map(&listeners, &happy_songs, |&(user, played), &song| {
            (!played.contains(&song.song_id)).then_some((user, song))
        });

    top_n_within(
        candidates,
        |&(user, _)| user,
        |&(_, song)| song.song_id.as_str(),
        SortOrder::Ascending,
        config.recommendations_per_user,
    )
    .into_iter()
    .map(|ranked| {
        let (user, song) = ranked.row;
        Recommendation {
            user_id: user.to_string(),
            song_id: song.song_id.clone(),
            title: song.title.clone(),
            artist: song.artist.clone(),
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{event, song};

    fn catalog() -> Vec<Song> {
        vec![
            song("sad_1", "Jazz", "Sad"),
            song("sad_2", "Rock", "Sad"),
            song("happy_4", "Pop", "Happy"),
            song("happy_1", "Pop", "Happy"),
            song("happy_3", "Rock", "Happy"),
            song("happy_2", "Jazz", "Happy"),
            song("chill_1", "Classical", "Chill"),
        ]
    }

    fn recommend(events: &[ListeningEvent], songs: &[Song]) -> Vec<Recommendation> {
        let input = AnalysisInput::new(events, songs);
        happy_recommendations(&input, &AnalysisConfig::default())
    }

    #[test]
    fn test_sad_listener_gets_three_unplayed_happy_songs() {
        let songs = catalog();
        let events = vec![
            event("u1", "sad_1", "2024-04-01 10:00:00", 100),
            event("u1", "sad_2", "2024-04-01 11:00:00", 100),
            event("u1", "happy_1", "2024-04-01 12:00:00", 100),
        ];

        let recs = recommend(&events, &songs);

        let ids: Vec<_> = recs.iter().map(|r| r.song_id.as_str()).collect();
        assert_eq!(ids, vec!["happy_2", "happy_3", "happy_4"]);
        assert!(recs.iter().all(|r| r.user_id == "u1"));
        assert_eq!(recs[0].title, "Title of happy_2");
        assert_eq!(recs[0].artist, "Artist of happy_2");
    }

    #[test]
    fn test_even_split_does_not_qualify() {
        let songs = catalog();
        let events = vec![
            event("u1", "sad_1", "2024-04-01 10:00:00", 100),
            event("u1", "chill_1", "2024-04-01 11:00:00", 100),
        ];

        assert!(recommend(&events, &songs).is_empty());
    }

    #[test]
    fn test_user_without_sad_plays_has_zero_ratio() {
        let songs = catalog();
        let events = vec![
            event("u1", "happy_1", "2024-04-01 10:00:00", 100),
            event("u2", "sad_1", "2024-04-01 10:00:00", 100),
        ];
        let input = AnalysisInput::new(&events, &songs);

        let profiles = mood_profiles(&input.joined, "Sad");

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0], MoodProfile { user_id: "u1", total: 1, sad: 0 });
        assert_eq!(profiles[0].sad_ratio(), Some(0.0));
        assert_eq!(profiles[1].sad_ratio(), Some(1.0));
    }

    #[test]
    fn test_zero_total_never_divides() {
        let profile = MoodProfile { user_id: "u1", total: 0, sad: 0 };
        assert_eq!(profile.sad_ratio(), None);
    }

    #[test]
    fn test_unjoined_plays_do_not_count_toward_ratio() {
        let songs = catalog();
        // two dangling plays would make the user 1/3 sad if they counted
        let events = vec![
            event("u1", "sad_1", "2024-04-01 10:00:00", 100),
            event("u1", "ghost", "2024-04-01 11:00:00", 100),
            event("u1", "ghost", "2024-04-01 12:00:00", 100),
        ];

        let recs = recommend(&events, &songs);

        assert_eq!(recs.len(), 3);
    }

    #[test]
    fn test_fewer_candidates_than_limit() {
        let songs = catalog();
        let mut events: Vec<_> = ["happy_1", "happy_2", "happy_3"]
            .iter()
            .map(|id| event("u1", id, "2024-04-01 10:00:00", 100))
            .collect();
        for _ in 0..4 {
            events.push(event("u1", "sad_1", "2024-04-01 11:00:00", 100));
        }

        let recs = recommend(&events, &songs);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].song_id, "happy_4");
    }

    #[test]
    fn test_recommendations_partitioned_per_user() {
        let songs = catalog();
        let events = vec![
            event("u2", "sad_2", "2024-04-01 10:00:00", 100),
            event("u1", "sad_1", "2024-04-01 10:00:00", 100),
            event("u1", "happy_2", "2024-04-01 10:00:00", 100),
            event("u1", "sad_2", "2024-04-01 10:00:00", 100),
            event("u3", "chill_1", "2024-04-01 10:00:00", 100),
        ];

        let recs = recommend(&events, &songs);

        let pairs: Vec<_> = recs.iter().map(|r| (r.user_id.as_str(), r.song_id.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("u1", "happy_1"),
                ("u1", "happy_3"),
                ("u1", "happy_4"),
                ("u2", "happy_1"),
                ("u2", "happy_2"),
                ("u2", "happy_3"),
            ]
        );
    }
}

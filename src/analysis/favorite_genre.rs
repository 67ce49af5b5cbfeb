//! Favorite genre per user.
//!
//! Count joined plays per (user, genre), rank genres per user by count and
//! keep the top one. On equal counts the alphabetically first genre wins.

use crate::relational::{group_aggregate, top_n_within, Count, SortOrder};
use crate::schema::JoinedEvent;
use serde::Serialize;
use std::cmp::Reverse;

/// A user's most played genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteGenre {
    pub user_id: String,
    pub genre: String,
    /// Plays of `genre` by this user
    pub count: u64,
}

/// One row per user with at least one joined play, ordered by `user_id`.
#[must_use]
pub fn favorite_genres(joined: &[JoinedEvent<'_>]) -> Vec<FavoriteGenre> {
    let genre_counts: Vec<(&str, &str, u64)> =
        group_aggregate(joined, |e| (e.user_id(), e.genre()), Count)
            .into_iter()
            .map(|((user, genre), count)| (user, genre, count))
            .collect();

    top_n_within(
        genre_counts,
        |&(user, _, _)| user,
        |&(_, genre, count)| (count, Reverse(genre)),
        SortOrder::Descending,
        1,
    )
    .into_iter()
    .map(|ranked| {
        let (user, genre, count) = ranked.row;
        FavoriteGenre {
            user_id: user.to_string(),
            genre: genre.to_string(),
            count,
        }
    })
    .collect()
}

//! Genre loyalty: how concentrated a listener is on a single genre.
//!
//! `loyalty_score = max_plays / total_plays`, where `max_plays` is the play
//! count of the user's most played genre. Only scores strictly above the
//! threshold are reported.

use super::ratio;
use crate::relational::{group_aggregate, inner_join, Count, Max};
use crate::schema::JoinedEvent;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoyaltyScore {
    pub user_id: String,
    pub loyalty_score: f64,
}

/// Users whose loyalty score exceeds `threshold`, ordered by `user_id`.
#[must_use]
pub fn genre_loyalty_scores(joined: &[JoinedEvent<'_>], threshold: f64) -> Vec<LoyaltyScore> {
    let total_plays: Vec<(&str, u64)> = group_aggregate(joined, |e| e.user_id(), Count)
        .into_iter()
        .collect();

    let genre_plays: Vec<(&str, u64)> = group_aggregate(joined, |e| (e.user_id(), e.genre()), Count)
        .into_iter()
        .map(|((user, _), plays)| (user, plays))
        .collect();
    let max_plays: Vec<(&str, u64)> = group_aggregate(&genre_plays, |&(user, _)| user, Max(|row: &(&str, u64)| row.1))
        .into_iter()
        .collect();

    inner_join(
        &total_plays,
        &max_plays,
        |&(user, _)| user,
        |&(user, _)| user,
        |&(user, total), &(_, max)| (user, ratio(max, total)),
    )
    .into_iter()
    .filter_map(|(user, score)| match score {
        Some(score) if score > threshold => Some(LoyaltyScore {
            user_id: user.to_string(),
            loyalty_score: score,
        }),
        _ => None,
    })
    .collect()
}

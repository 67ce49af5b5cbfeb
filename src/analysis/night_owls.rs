//! Night owls: users with at least one play inside the night window
//! (00:00 to 04:59 by default). Membership only, no counts.

use crate::schema::ListeningEvent;
use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NightOwl {
    pub user_id: String,
}

/// Distinct users with a play whose hour falls in `hours`, sorted.
#[must_use]
pub fn night_owl_users(events: &[ListeningEvent], hours: Range<u32>) -> Vec<NightOwl> {
    events
        .iter()
        .filter(|e| hours.contains(&e.hour()))
        .map(|e| e.user_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|user_id| NightOwl { user_id: user_id.to_string() })
        .collect()
}

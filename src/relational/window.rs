//! # Window Ranking
//!
//! Partition-by / order-by row numbering. Within each partition rows are
//! sorted by a key in the requested direction and numbered from 1. The sort
//! is stable: rows with equal keys keep their input order, so the numbering
//! is deterministic for a fixed input. Callers that need a specific winner
//! on ties fold a tiebreaker into the sort key.
//!
//! ```
//! use music_insights::relational::{top_n_within, SortOrder};
//! use std::cmp::Reverse;
//!
//! // (user, genre, plays): favourite genre per user, ties to the smaller name
//! let counts = vec![("u1", "Rock", 3), ("u1", "Jazz", 3), ("u2", "Pop", 1)];
//! let top = top_n_within(counts, |r| r.0, |r| (r.2, Reverse(r.1)), SortOrder::Descending, 1);
//! assert_eq!(top[0].row, ("u1", "Jazz", 3));
//! assert_eq!(top[1].row, ("u2", "Pop", 1));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Direction of the ordering inside a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest key gets rank 1
    Ascending,
    /// Largest key gets rank 1
    Descending,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// A row with its 1-based position inside its partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: usize,
    pub row: T,
}

/// Number every row within its partition.
///
/// Partitions are emitted in ascending partition-key order; rows inside a
/// partition in rank order.
pub fn rank_within<T, P, S>(
    rows: Vec<T>,
    partition: impl Fn(&T) -> P,
    sort_key: impl Fn(&T) -> S,
    order: SortOrder,
) -> Vec<Ranked<T>>
where
    P: Ord,
    S: Ord,
{
    let mut partitions: BTreeMap<P, Vec<(S, T)>> = BTreeMap::new();
    for row in rows {
        partitions
            .entry(partition(&row))
            .or_default()
            .push((sort_key(&row), row));
    }

    let mut ranked = Vec::new();
    for (_, mut members) in partitions {
        // `sort_by` is stable; equal keys keep input order
        members.sort_by(|(a, _), (b, _)| order.apply(a.cmp(b)));
        ranked.extend(
            members
                .into_iter()
                .enumerate()
                .map(|(i, (_, row))| Ranked { rank: i + 1, row }),
        );
    }
    ranked
}

/// Keep rows ranked `1..=n` within each partition.
pub fn top_n_within<T, P, S>(
    rows: Vec<T>,
    partition: impl Fn(&T) -> P,
    sort_key: impl Fn(&T) -> S,
    order: SortOrder,
    n: usize,
) -> Vec<Ranked<T>>
where
    P: Ord,
    S: Ord,
{
    rank_within(rows, partition, sort_key, order)
        .into_iter()
        .filter(|ranked| ranked.rank <= n)
        .collect()
}

/// Global top-N: a single partition spanning the whole relation.
pub fn top_n<T, S>(rows: Vec<T>, sort_key: impl Fn(&T) -> S, order: SortOrder, n: usize) -> Vec<T>
where
    S: Ord,
{
    top_n_within(rows, |_| (), sort_key, order, n)
        .into_iter()
        .map(|ranked| ranked.row)
        .collect()
}

//! Equi-joins over row slices.
//!
//! The right-hand relation is indexed into a hash table and the left one is
//! probed in input order, so the output follows left order and, within one
//! left row, right order. Keys are never assumed unique: every matching pair
//! produces a row.

use std::collections::HashMap;
use std::hash::Hash;

fn index<'r, R, K>(right: &'r [R], right_key: impl Fn(&'r R) -> K) -> HashMap<K, Vec<&'r R>>
where
    K: Eq + Hash,
{
    let mut table: HashMap<K, Vec<&'r R>> = HashMap::with_capacity(right.len());
    for row in right {
        table.entry(right_key(row)).or_default().push(row);
    }
    table
}

/// Inner join: one output row per `(l, r)` pair with equal keys.
///
/// Left rows without a match and right rows without a match are dropped.
///
/// # Examples
///
/// ```
/// use music_insights::relational::inner_join;
///
/// let plays = [("s1", 120), ("s9", 60), ("s1", 90)];
/// let songs = [("s1", "Pop")];
/// let joined = inner_join(&plays, &songs, |p| p.0, |s| s.0, |p, s| (p.1, s.1));
/// assert_eq!(joined, vec![(120, "Pop"), (90, "Pop")]);
/// ```
pub fn inner_join<'l, 'r, L, R, K, O>(
    left: &'l [L],
    right: &'r [R],
    left_key: impl Fn(&'l L) -> K,
    right_key: impl Fn(&'r R) -> K,
    combine: impl Fn(&'l L, &'r R) -> O,
) -> Vec<O>
where
    K: Eq + Hash,
{
    let table = index(right, right_key);
    let mut out = Vec::with_capacity(left.len());
    for l in left {
        if let Some(matches) = table.get(&left_key(l)) {
            out.extend(matches.iter().map(|&r| combine(l, r)));
        }
    }
    out
}

/// Left outer join: every left row appears, paired with each match or once
/// with `None`.
pub fn left_join<'l, 'r, L, R, K, O>(
    left: &'l [L],
    right: &'r [R],
    left_key: impl Fn(&'l L) -> K,
    right_key: impl Fn(&'r R) -> K,
    combine: impl Fn(&'l L, Option<&'r R>) -> O,
) -> Vec<O>
where
    K: Eq + Hash,
{
    let table = index(right, right_key);
    let mut out = Vec::with_capacity(left.len());
    for l in left {
        match table.get(&left_key(l)) {
            Some(matches) => out.extend(matches.iter().map(|&r| combine(l, Some(r)))),
            None => out.push(combine(l, None)),
        }
    }
    out
}

/// Cartesian product, left-major.
pub fn cross_join<'l, 'r, L, R, O>(
    left: &'l [L],
    right: &'r [R],
    combine: impl Fn(&'l L, &'r R) -> O,
) -> Vec<O> {
    cross_join_filter_map(left, right, |l, r| Some(combine(l, r)))
}

/// Cartesian product that keeps only the pairs `combine` maps to `Some`.
///
/// Pairs are filtered as they are produced, so the full product is never
/// materialized.
pub fn cross_join_filter_map<'l, 'r, L, R, O>(
    left: &'l [L],
    right: &'r [R],
    combine: impl Fn(&'l L, &'r R) -> Option<O>,
) -> Vec<O> {
    let mut out = Vec::new();
    for l in left {
        out.extend(right.iter().filter_map(|r| combine(l, r)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_join_drops_unmatched_on_both_sides() {
        let left = [("a", 1), ("b", 2), ("c", 3)];
        let right = [("b", "B"), ("c", "C"), ("d", "D")];

        let joined = inner_join(&left, &right, |l| l.0, |r| r.0, |l, r| (l.1, r.1));

        assert_eq!(joined, vec![(2, "B"), (3, "C")]);
    }

    #[test]
    fn test_inner_join_emits_every_match_for_duplicate_keys() {
        let left = [("k", 1), ("k", 2)];
        let right = [("k", 'x'), ("k", 'y')];

        let joined = inner_join(&left, &right, |l| l.0, |r| r.0, |l, r| (l.1, r.1));

        assert_eq!(joined, vec![(1, 'x'), (1, 'y'), (2, 'x'), (2, 'y')]);
    }

    #[test]
    fn test_inner_join_empty_inputs() {
        let left: [(&str, i32); 0] = [];
        let right = [("a", 1)];

        assert!(inner_join(&left, &right, |l| l.0, |r| r.0, |l, r| (l.1, r.1)).is_empty());
        assert!(inner_join(&right, &left, |l| l.0, |r| r.0, |l, r| (l.1, r.1)).is_empty());
    }

    #[test]
    fn test_left_join_keeps_unmatched_left_rows() {
        let totals = [("u1", 4u64), ("u2", 2)];
        let sad = [("u1", 3u64)];

        let joined = left_join(&totals, &sad, |t| t.0, |s| s.0, |t, s| (t.0, t.1, s.map_or(0, |s| s.1)));

        assert_eq!(joined, vec![("u1", 4, 3), ("u2", 2, 0)]);
    }

    #[test]
    fn test_cross_join_is_left_major() {
        let users = ["u1", "u2"];
        let songs = ["s1", "s2", "s3"];

        let pairs = cross_join(&users, &songs, |u, s| format!("{u}:{s}"));

        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], "u1:s1");
        assert_eq!(pairs[3], "u2:s1");
    }

    #[test]
    fn test_cross_join_filter_map_drops_pairs_while_producing() {
        let users = [("u1", vec!["s1"]), ("u2", vec!["s1", "s3"])];
        let songs = ["s1", "s2", "s3"];

        let unplayed = cross_join_filter_map(&users, &songs, |(user, played), song| {
            (!played.contains(song)).then(|| (*user, *song))
        });

        assert_eq!(unplayed, vec![("u1", "s2"), ("u1", "s3"), ("u2", "s2")]);
    }

    #[test]
    fn test_cross_join_with_empty_side() {
        let users = ["u1", "u2"];
        let songs: [&str; 0] = [];

        assert!(cross_join(&users, &songs, |u, s| (*u, *s)).is_empty());
        assert!(cross_join(&songs, &users, |s, u| (*s, *u)).is_empty());
    }
}

//! # Grouping and Aggregation
//!
//! `group_aggregate` folds a relation into one value per distinct key using
//! a [`Reducer`]. Accumulators are created from the first row of a group, so
//! a group only exists if at least one row carries its key.
//!
//! `par_group_aggregate` splits the rows across the rayon pool, folds each
//! chunk into partial accumulators and merges them. For every reducer here
//! the merged result equals the sequential one.
//!
//! Results come back as a [`BTreeMap`] so downstream iteration is ordered by
//! key.

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// A group-wise reduction over rows of type `T`.
pub trait Reducer<T> {
    /// Running state for one group.
    type Acc;
    /// Final value emitted per group.
    type Output;

    /// Accumulator for a group whose first row is `row`.
    fn start(&self, row: &T) -> Self::Acc;

    /// Fold another row of the same group into `acc`.
    fn update(&self, acc: &mut Self::Acc, row: &T);

    /// Combine two partial accumulators of the same group.
    fn merge(&self, acc: &mut Self::Acc, other: Self::Acc);

    fn finish(&self, acc: Self::Acc) -> Self::Output;
}

/// Number of rows in the group.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl<T> Reducer<T> for Count {
    type Acc = u64;
    type Output = u64;

    fn start(&self, _row: &T) -> u64 {
        1
    }

    fn update(&self, acc: &mut u64, _row: &T) {
        *acc += 1;
    }

    fn merge(&self, acc: &mut u64, other: u64) {
        *acc += other;
    }

    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}

/// Sum of an integer column.
///
/// Accumulates in `i128`, which cannot overflow for fewer than 2^64 rows of
/// `i64` values.
#[derive(Debug, Clone, Copy)]
pub struct Sum<F>(pub F);

impl<T, F> Reducer<T> for Sum<F>
where
    F: Fn(&T) -> i64,
{
    type Acc = i128;
    type Output = i128;

    fn start(&self, row: &T) -> i128 {
        i128::from((self.0)(row))
    }

    fn update(&self, acc: &mut i128, row: &T) {
        *acc += i128::from((self.0)(row));
    }

    fn merge(&self, acc: &mut i128, other: i128) {
        *acc += other;
    }

    fn finish(&self, acc: i128) -> i128 {
        acc
    }
}

/// Arithmetic mean of an integer column: group sum divided by group count.
///
/// The sum is kept in `i128` like [`Sum`].
#[derive(Debug, Clone, Copy)]
pub struct Average<F>(pub F);

impl<T, F> Reducer<T> for Average<F>
where
    F: Fn(&T) -> i64,
{
    type Acc = (i128, u64);
    type Output = f64;

    fn start(&self, row: &T) -> (i128, u64) {
        (i128::from((self.0)(row)), 1)
    }

    fn update(&self, acc: &mut (i128, u64), row: &T) {
        acc.0 += i128::from((self.0)(row));
        acc.1 += 1;
    }

    fn merge(&self, acc: &mut (i128, u64), other: (i128, u64)) {
        acc.0 += other.0;
        acc.1 += other.1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, (sum, count): (i128, u64)) -> f64 {
        // count >= 1: accumulators only exist for non-empty groups
        sum as f64 / count as f64
    }
}

/// Largest value of an ordered column.
#[derive(Debug, Clone, Copy)]
pub struct Max<F>(pub F);

impl<T, F, V> Reducer<T> for Max<F>
where
    F: Fn(&T) -> V,
    V: Ord,
{
    type Acc = V;
    type Output = V;

    fn start(&self, row: &T) -> V {
        (self.0)(row)
    }

    fn update(&self, acc: &mut V, row: &T) {
        let value = (self.0)(row);
        if value > *acc {
            *acc = value;
        }
    }

    fn merge(&self, acc: &mut V, other: V) {
        if other > *acc {
            *acc = other;
        }
    }

    fn finish(&self, acc: V) -> V {
        acc
    }
}

/// Set of distinct values of a column within the group.
#[derive(Debug, Clone, Copy)]
pub struct Distinct<F>(pub F);

impl<T, F, V> Reducer<T> for Distinct<F>
where
    F: Fn(&T) -> V,
    V: Ord,
{
    type Acc = BTreeSet<V>;
    type Output = BTreeSet<V>;

    fn start(&self, row: &T) -> BTreeSet<V> {
        BTreeSet::from([(self.0)(row)])
    }

    fn update(&self, acc: &mut BTreeSet<V>, row: &T) {
        acc.insert((self.0)(row));
    }

    fn merge(&self, acc: &mut BTreeSet<V>, other: BTreeSet<V>) {
        acc.extend(other);
    }

    fn finish(&self, acc: BTreeSet<V>) -> BTreeSet<V> {
        acc
    }
}

fn fold_row<T, K, R>(groups: &mut BTreeMap<K, R::Acc>, key: K, row: &T, reducer: &R)
where
    K: Ord,
    R: Reducer<T>,
{
    match groups.get_mut(&key) {
        Some(acc) => reducer.update(acc, row),
        None => {
            groups.insert(key, reducer.start(row));
        }
    }
}

/// Group `rows` by `key` and reduce each group.
///
/// Keys may borrow from the rows.
///
/// # Examples
///
/// ```
/// use music_insights::relational::{group_aggregate, Average};
///
/// let plays: [(&str, i64); 3] = [("s1", 100), ("s2", 60), ("s1", 200)];
/// let avg = group_aggregate(&plays, |p| p.0, Average(|p: &(&str, i64)| p.1));
/// assert_eq!(avg["s1"], 150.0);
/// assert_eq!(avg["s2"], 60.0);
/// ```
pub fn group_aggregate<'a, T, K, R>(
    rows: &'a [T],
    key: impl Fn(&'a T) -> K,
    reducer: R,
) -> BTreeMap<K, R::Output>
where
    K: Ord,
    R: Reducer<T>,
{
    let mut groups = BTreeMap::new();
    for row in rows {
        fold_row(&mut groups, key(row), row, &reducer);
    }
    groups
        .into_iter()
        .map(|(k, acc)| (k, reducer.finish(acc)))
        .collect()
}

/// Data-parallel [`group_aggregate`]: partial folds per worker, then merge.
pub fn par_group_aggregate<'a, T, K, R>(
    rows: &'a [T],
    key: impl Fn(&'a T) -> K + Sync + Send,
    reducer: R,
) -> BTreeMap<K, R::Output>
where
    T: Sync,
    K: Ord + Send,
    R: Reducer<T> + Sync,
    R::Acc: Send,
{
    let groups = rows
        .par_iter()
        .fold(BTreeMap::new, |mut groups, row| {
            fold_row(&mut groups, key(row), row, &reducer);
            groups
        })
        .reduce(BTreeMap::new, |mut left, right| {
            for (k, acc) in right {
                match left.get_mut(&k) {
                    Some(existing) => reducer.merge(existing, acc),
                    None => {
                        left.insert(k, acc);
                    }
                }
            }
            left
        });
    groups
        .into_iter()
        .map(|(k, acc)| (k, reducer.finish(acc)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    type Play = (&'static str, &'static str, i64);

    fn plays() -> Vec<Play> {
        vec![
            ("u1", "Pop", 120),
            ("u1", "Rock", 60),
            ("u2", "Jazz", 300),
            ("u1", "Pop", 90),
            ("u2", "Jazz", 100),
        ]
    }

    #[test]
    fn test_count_per_key() {
        let counts = group_aggregate(&plays(), |p| (p.0, p.1), Count);

        assert_eq!(counts.len(), 3);
        assert_eq!(counts[&("u1", "Pop")], 2);
        assert_eq!(counts[&("u1", "Rock")], 1);
        assert_eq!(counts[&("u2", "Jazz")], 2);
    }

    #[test]
    fn test_sum_and_average() {
        let sums = group_aggregate(&plays(), |p| p.0, Sum(|p: &Play| p.2));
        let avgs = group_aggregate(&plays(), |p| p.0, Average(|p: &Play| p.2));

        assert_eq!(sums["u1"], 270);
        assert_eq!(sums["u2"], 400);
        assert_eq!(avgs["u1"], 90.0);
        assert_eq!(avgs["u2"], 200.0);
    }

    #[test]
    fn test_max_and_distinct() {
        let max = group_aggregate(&plays(), |p| p.0, Max(|p: &Play| p.2));
        let genres = group_aggregate(&plays(), |p| p.0, Distinct(|p: &Play| p.1));

        assert_eq!(max["u1"], 120);
        assert_eq!(max["u2"], 300);
        assert_eq!(genres["u1"].iter().copied().collect::<Vec<_>>(), vec!["Pop", "Rock"]);
        assert_eq!(genres["u2"].len(), 1);
    }

    #[test]
    fn test_sums_near_i64_limits_do_not_overflow() {
        let rows: Vec<Play> = vec![
            ("u1", "Pop", i64::MAX),
            ("u1", "Pop", 1),
            ("u2", "Jazz", i64::MIN),
            ("u2", "Jazz", -1),
        ];

        let sums = group_aggregate(&rows, |p| p.0, Sum(|p: &Play| p.2));
        assert_eq!(sums["u1"], i128::from(i64::MAX) + 1);
        assert_eq!(sums["u2"], i128::from(i64::MIN) - 1);

        let seq = group_aggregate(&rows, |p| p.0, Average(|p: &Play| p.2));
        let par = par_group_aggregate(&rows, |p| p.0, Average(|p: &Play| p.2));
        assert!(seq["u1"] > 4.6e18);
        assert!(seq["u2"] < -4.6e18);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_empty_relation_has_no_groups() {
        let rows: Vec<Play> = Vec::new();
        assert!(group_aggregate(&rows, |p| p.0, Count).is_empty());
        assert!(par_group_aggregate(&rows, |p| p.0, Average(|p: &Play| p.2)).is_empty());
    }

    #[test]
    fn test_keys_come_back_ordered() {
        let counts = group_aggregate(&plays(), |p| p.1, Count);
        let keys: Vec<_> = counts.keys().copied().collect();
        assert_eq!(keys, vec!["Jazz", "Pop", "Rock"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows: Vec<(u32, i64)> = (0..10_000).map(|i| (i % 37, i64::from(i % 251))).collect();

        let seq_avg = group_aggregate(&rows, |r| r.0, Average(|r: &(u32, i64)| r.1));
        let par_avg = par_group_aggregate(&rows, |r| r.0, Average(|r: &(u32, i64)| r.1));
        assert_eq!(seq_avg, par_avg);

        let seq_count = group_aggregate(&rows, |r| r.0, Count);
        let par_count = par_group_aggregate(&rows, |r| r.0, Count);
        assert_eq!(seq_count, par_count);

        let seq_max = group_aggregate(&rows, |r| r.0, Max(|r: &(u32, i64)| r.1));
        let par_max = par_group_aggregate(&rows, |r| r.0, Max(|r: &(u32, i64)| r.1));
        assert_eq!(seq_max, par_max);
    }
}

//! Seeded shuffling and fold splitting.
//!
//! Items are sorted by name before shuffling, so fold membership depends only
//! on `(seed, item names, num_folds)` and not on the order the items arrived in.

use crate::types::ScoredItem;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Returns `seed`, or draws a fresh one from the thread RNG.
///
/// A drawn seed is logged so the run can be reproduced.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(seed) => seed,
        None => {
            let seed: u64 = rand::thread_rng().gen();
            info!(seed, "No seed given, drew a random one");
            seed
        }
    }
}

/// Shuffles `items` deterministically and splits them into folds.
///
/// # Algorithm
///
/// 1. Sort by name (canonical pre-shuffle order)
/// 2. Shuffle with a `StdRng` seeded from `seed`
/// 3. Cut into consecutive chunks of `max(1, ceil(n / num_folds))` items
///
/// The last fold may be smaller. When `n < num_folds` fewer folds than
/// requested are produced, never empty ones; no items means no folds.
///
/// A `num_folds` of 0 is treated as 1.
pub fn partition(seed: u64, num_folds: usize, mut items: Vec<ScoredItem>) -> Vec<Vec<ScoredItem>> {
    items.sort_by(|a, b| a.name().cmp(b.name()));

    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let chunk_size = items.len().div_ceil(num_folds.max(1)).max(1);

    let mut folds = Vec::with_capacity(items.len().div_ceil(chunk_size));
    let mut remaining = items.into_iter().peekable();
    while remaining.peek().is_some() {
        folds.push(remaining.by_ref().take(chunk_size).collect::<Vec<_>>());
    }

    debug!(folds = folds.len(), "Split into folds");
    debug!(chunk_size, "Items per fold");

    folds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn items(n: usize) -> Vec<ScoredItem> {
        (0..n)
            .map(|i| ScoredItem::new(format!("q{i:03}"), BTreeMap::new()))
            .collect()
    }

    fn names(folds: &[Vec<ScoredItem>]) -> Vec<Vec<String>> {
        folds
            .iter()
            .map(|fold| fold.iter().map(|item| item.name().to_string()).collect())
            .collect()
    }

    #[test]
    fn test_partition_is_a_true_partition() {
        for n in 1..=30 {
            for k in 1..=n {
                let folds = partition(7, k, items(n));

                let all: Vec<String> = names(&folds).into_iter().flatten().collect();
                let unique: BTreeSet<&String> = all.iter().collect();
                assert_eq!(all.len(), n, "n={n} k={k}: every item exactly once");
                assert_eq!(unique.len(), n, "n={n} k={k}: no duplicates");
                assert!(folds.iter().all(|fold| !fold.is_empty()));
            }
        }
    }

    #[test]
    fn test_fold_sizes() {
        let folds = partition(1, 3, items(10));
        let sizes: Vec<usize> = folds.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_fewer_items_than_folds() {
        let folds = partition(1, 10, items(4));
        assert_eq!(folds.len(), 4);
        assert!(folds.iter().all(|fold| fold.len() == 1));
    }

    #[test]
    fn test_no_items_no_folds() {
        assert!(partition(1, 5, Vec::new()).is_empty());
    }

    #[test]
    fn test_zero_folds_treated_as_one() {
        let folds = partition(1, 0, items(5));
        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].len(), 5);
    }

    #[test]
    fn test_deterministic_regardless_of_input_order() {
        let forward = partition(42, 4, items(20));

        let mut reversed_input = items(20);
        reversed_input.reverse();
        let reversed = partition(42, 4, reversed_input);

        assert_eq!(names(&forward), names(&reversed));
    }

    #[test]
    fn test_different_seeds_shuffle_differently() {
        let a = partition(1, 1, items(50));
        let b = partition(2, 1, items(50));
        assert_ne!(names(&a), names(&b));
    }

    #[test]
    fn test_resolve_seed_keeps_explicit_seed() {
        assert_eq!(resolve_seed(Some(99)), 99);
    }
}

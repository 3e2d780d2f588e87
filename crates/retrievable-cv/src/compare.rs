//! Paired significance testing between two cross-validated runs.
//!
//! Two datasets (e.g. the same runs evaluated against two collections, or
//! two families of runs over the same queries) are cross-validated with the
//! same fold count and seed, then compared item by item with a two-sided
//! paired Student's t-test.
//!
//! # References
//!
//! - Smucker et al. (2007). "A comparison of statistical significance tests for IR evaluation"

use crate::error::CompareError;
use crate::partition::resolve_seed;
use crate::summary::{Mean, Summarizer};
use crate::testing::Tester;
use crate::types::ScoredItem;
use crate::validator::KFoldValidator;
use elinor::statistical_tests::StudentTTest;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Result of comparing two cross-validated runs.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Comparison {
    /// Summary score of the first run
    pub first_summary: f64,
    /// Summary score of the second run
    pub second_summary: f64,
    /// Two-tailed p-value of the paired t-test, NaN when the differences
    /// have zero variance
    pub p_value: f64,
    /// Effect size of the paired differences (first - second), NaN when the
    /// p-value is
    pub effect_size: f64,
    /// Number of paired items
    pub num_pairs: usize,
}

impl Comparison {
    /// Returns true if the difference is significant at the given alpha level.
    ///
    /// A NaN p-value is never significant.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Pairs the scores of two runs item by item.
///
/// Iterates the items of `first` and looks each one up in `second`, so both
/// vectors are aligned on the same item names. Every item must appear in
/// both runs.
///
/// `elinor::statistical_tests::pairs_from_maps` is not used because it does
/// not keep the first run's key order or name the mismatched item.
///
/// # Errors
///
/// [`CompareError::KeyMismatch`] naming the first item found in only one run.
pub fn paired_scores(
    first: &BTreeMap<String, f64>,
    second: &BTreeMap<String, f64>,
) -> Result<Vec<(f64, f64)>, CompareError> {
    let pairs = first
        .iter()
        .map(|(name, &score)| match second.get(name) {
            Some(&other) => Ok((score, other)),
            None => Err(CompareError::KeyMismatch(name.clone())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if second.len() != first.len() {
        if let Some(extra) = second.keys().find(|name| !first.contains_key(*name)) {
            return Err(CompareError::KeyMismatch(extra.clone()));
        }
    }

    Ok(pairs)
}

/// Compares two item name -> score maps.
#[derive(Debug, Clone, Default)]
pub struct Comparator<S = Mean> {
    summarizer: S,
}

impl<S: Summarizer> Comparator<S> {
    pub fn new(summarizer: S) -> Self {
        Self { summarizer }
    }

    /// Summarizes both runs and runs a paired t-test over their scores.
    ///
    /// # Errors
    ///
    /// - [`CompareError::KeyMismatch`] if the runs cover different items
    /// - [`CompareError::Statistic`] if there are fewer than two pairs
    ///
    /// When every paired difference is the same (e.g. a run compared with
    /// itself) the t statistic is undefined; the summaries are still
    /// reported, with NaN p-value and effect size.
    pub fn compare(
        &self,
        first: &BTreeMap<String, f64>,
        second: &BTreeMap<String, f64>,
    ) -> Result<Comparison, CompareError> {
        let pairs = paired_scores(first, second)?;
        if pairs.len() < 2 {
            return Err(CompareError::Statistic(format!(
                "need at least two paired items, got {}",
                pairs.len()
            )));
        }

        let (first_scores, second_scores): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
        let stat = StudentTTest::from_paired_samples(pairs.iter().copied());
        let (p_value, effect_size) = match stat {
            Ok(stat) => (stat.p_value(), stat.effect_size()),
            Err(e) => {
                warn!(error = %e, "Paired t-test undefined, reporting NaN p-value");
                (f64::NAN, f64::NAN)
            }
        };

        Ok(Comparison {
            first_summary: self.summarizer.summarize(&first_scores),
            second_summary: self.summarizer.summarize(&second_scores),
            p_value,
            effect_size,
            num_pairs: pairs.len(),
        })
    }
}

/// Cross-validates two datasets with the same validator and seed, then compares them.
///
/// When `seed` is `None` a single seed is drawn and used for both runs.
/// Summaries use the validator's summarizer.
pub fn compare_datasets<T, S>(
    validator: &KFoldValidator<T, S>,
    first: Vec<ScoredItem>,
    second: Vec<ScoredItem>,
    seed: Option<u64>,
) -> Result<Comparison, CompareError>
where
    T: Tester<Output = f64>,
    S: Summarizer,
{
    let seed = resolve_seed(seed);
    let first = validator.cross_validate(first, Some(seed))?;
    let second = validator.cross_validate(second, Some(seed))?;

    Comparator::new(|scores: &[f64]| validator.summarize(scores)).compare(&first, &second)
}

//! k-fold cross-validation.
//!
//! # Protocol
//!
//! ```text
//! items ──partition──▶ [f0, f1, ..., fk-1]
//!                         │
//!        for each fold i: │ train(all folds except fi) ──▶ best parameter
//!                         │ test(fi, best parameter)   ──▶ results_i
//!                         ▼
//!        concatenate results_0..k-1 ──▶ name -> result
//! ```
//!
//! Each item is tested in exactly one fold, and the parameter it is tested
//! with was selected without looking at that item's scores.

use crate::config::DEFAULT_NUM_FOLDS;
use crate::error::ValidationError;
use crate::partition::{partition, resolve_seed};
use crate::summary::{Mean, Summarizer};
use crate::testing::{ScoredTester, Tester};
use crate::train::Trainer;
use crate::types::ScoredItem;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, instrument};

/// Outcome of one held-out fold.
#[derive(Debug, Clone, Serialize)]
pub struct FoldReport<T> {
    /// Fold index
    pub index: usize,
    /// Number of held-out items
    pub size: usize,
    /// Parameter selected on the training folds
    pub parameter: String,
    /// Summary score of that parameter on the training folds
    pub training_score: f64,
    /// Item name -> test result
    pub results: BTreeMap<String, T>,
}

/// Outcome of a complete cross-validation run.
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidation<T> {
    /// Seed the items were shuffled with
    pub seed: u64,
    /// Per-fold outcomes in fold order
    pub folds: Vec<FoldReport<T>>,
}

impl<T> CrossValidation<T> {
    /// Merges all folds into one item name -> result map.
    pub fn concatenate(self) -> BTreeMap<String, T> {
        self.folds
            .into_iter()
            .flat_map(|fold| fold.results)
            .collect()
    }

    /// Per-fold results, indexed by fold.
    pub fn by_fold(self) -> Vec<BTreeMap<String, T>> {
        self.folds.into_iter().map(|fold| fold.results).collect()
    }
}

/// k-fold cross-validator with pluggable tester and summarizer.
///
/// # Example
///
/// ```
/// use retrievable_cv::{KFoldValidator, Median};
///
/// let validator = KFoldValidator::new(5).with_summarizer(Median);
/// assert_eq!(validator.summarize(&[1.0, 2.0, 10.0]), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct KFoldValidator<T = ScoredTester, S = Mean> {
    num_folds: usize,
    tester: T,
    trainer: Trainer<S>,
}

impl KFoldValidator {
    /// Scored tester, mean summarizer.
    pub fn new(num_folds: usize) -> Self {
        Self {
            num_folds,
            tester: ScoredTester,
            trainer: Trainer::new(Mean),
        }
    }
}

impl Default for KFoldValidator {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_FOLDS)
    }
}

impl<T: Tester, S: Summarizer> KFoldValidator<T, S> {
    /// Replaces the tester.
    pub fn with_tester<U: Tester>(self, tester: U) -> KFoldValidator<U, S> {
        KFoldValidator {
            num_folds: self.num_folds,
            tester,
            trainer: self.trainer,
        }
    }

    /// Replaces the summarizer used for training and reporting.
    pub fn with_summarizer<R: Summarizer>(self, summarizer: R) -> KFoldValidator<T, R> {
        KFoldValidator {
            num_folds: self.num_folds,
            tester: self.tester,
            trainer: Trainer::new(summarizer),
        }
    }

    pub fn num_folds(&self) -> usize {
        self.num_folds
    }

    pub fn tester(&self) -> &T {
        &self.tester
    }

    /// Summarizes scores with the same rule used to select parameters.
    pub fn summarize(&self, scores: &[f64]) -> f64 {
        self.trainer.summarizer().summarize(scores)
    }

    /// Summarizes the values of an item name -> score map.
    pub fn summarize_results(&self, results: &BTreeMap<String, f64>) -> f64 {
        let scores: Vec<f64> = results.values().copied().collect();
        self.summarize(&scores)
    }

    /// Runs cross-validation and returns per-item results merged across folds.
    ///
    /// See [`run`](Self::run) for `seed` and errors.
    pub fn cross_validate(
        &self,
        items: Vec<ScoredItem>,
        seed: Option<u64>,
    ) -> Result<BTreeMap<String, T::Output>, ValidationError> {
        Ok(self.run(items, seed)?.concatenate())
    }

    /// Runs cross-validation and keeps results separated by fold.
    pub fn cross_validate_by_fold(
        &self,
        items: Vec<ScoredItem>,
        seed: Option<u64>,
    ) -> Result<Vec<BTreeMap<String, T::Output>>, ValidationError> {
        Ok(self.run(items, seed)?.by_fold())
    }

    /// Runs the full train/test protocol over every fold.
    ///
    /// `seed` fixes the shuffle; when `None` one is drawn and recorded in the
    /// returned [`CrossValidation`].
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidFoldCount`] if the validator has 0 folds
    /// - [`ValidationError::DuplicateItem`] if two items share a name
    /// - [`ValidationError::NoParameters`] if a fold's training set has no
    ///   scores at all (e.g. a single item, or a single fold)
    /// - [`ValidationError::Test`] if the tester fails
    #[instrument(skip_all, fields(items = items.len(), num_folds = self.num_folds))]
    pub fn run(
        &self,
        items: Vec<ScoredItem>,
        seed: Option<u64>,
    ) -> Result<CrossValidation<T::Output>, ValidationError> {
        if self.num_folds == 0 {
            return Err(ValidationError::InvalidFoldCount(self.num_folds));
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.name()) {
                return Err(ValidationError::DuplicateItem(item.name().to_string()));
            }
        }

        let seed = resolve_seed(seed);
        let folds = partition(seed, self.num_folds, items);

        let mut reports = Vec::with_capacity(folds.len());
        for (index, fold) in folds.iter().enumerate() {
            let training = folds
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != index)
                .flat_map(|(_, other)| other.iter());

            let selection = self
                .trainer
                .train(training)
                .ok_or(ValidationError::NoParameters { fold: index })?;

            info!(
                fold = index,
                n = fold.len(),
                parameter = %selection.parameter,
                training_score = selection.score,
                "Best parameter for fold"
            );

            let results = self.tester.test(fold, &selection.parameter)?;

            reports.push(FoldReport {
                index,
                size: fold.len(),
                parameter: selection.parameter,
                training_score: selection.score,
                results,
            });
        }

        Ok(CrossValidation {
            seed,
            folds: reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::Median;

    fn item(name: &str, scores: &[(&str, f64)]) -> ScoredItem {
        ScoredItem::new(
            name,
            scores.iter().map(|&(p, s)| (p.to_string(), s)).collect(),
        )
    }

    fn uniform_items(n: usize) -> Vec<ScoredItem> {
        (0..n)
            .map(|i| item(&format!("q{i}"), &[("x", 0.8), ("y", 0.2)]))
            .collect()
    }

    #[test]
    fn test_end_to_end_uniform_winner() {
        let results = KFoldValidator::new(5)
            .cross_validate(uniform_items(10), Some(3))
            .unwrap();

        assert_eq!(results.len(), 10);
        assert!(results.values().all(|&score| score == 0.8));
    }

    #[test]
    fn test_every_item_reported_once() {
        let items: Vec<ScoredItem> = (0..23)
            .map(|i| item(&format!("q{i}"), &[("a", i as f64), ("b", 1.0)]))
            .collect();
        let names: Vec<String> = items.iter().map(|i| i.name().to_string()).collect();

        let run = KFoldValidator::new(4).run(items, Some(11)).unwrap();
        let total: usize = run.folds.iter().map(|fold| fold.results.len()).sum();
        let merged = run.concatenate();

        assert_eq!(total, 23);
        assert_eq!(merged.keys().cloned().collect::<Vec<_>>(), {
            let mut sorted = names;
            sorted.sort();
            sorted
        });
    }

    #[test]
    fn test_fold_reports() {
        let run = KFoldValidator::new(5)
            .run(uniform_items(10), Some(3))
            .unwrap();

        assert_eq!(run.seed, 3);
        assert_eq!(run.folds.len(), 5);
        for (i, fold) in run.folds.iter().enumerate() {
            assert_eq!(fold.index, i);
            assert_eq!(fold.size, 2);
            assert_eq!(fold.parameter, "x");
            assert!((fold.training_score - 0.8).abs() < 1e-12);
        }
    }

    #[test]
    fn test_by_fold_mode() {
        let folds = KFoldValidator::new(3)
            .cross_validate_by_fold(uniform_items(9), Some(5))
            .unwrap();

        assert_eq!(folds.len(), 3);
        assert!(folds.iter().all(|fold| fold.len() == 3));
    }

    #[test]
    fn test_same_seed_same_results() {
        let items: Vec<ScoredItem> = (0..12)
            .map(|i| item(&format!("q{i}"), &[("a", (i % 3) as f64), ("b", (i % 4) as f64)]))
            .collect();
        let mut shuffled = items.clone();
        shuffled.reverse();

        let validator = KFoldValidator::new(4);
        let first = validator.run(items, Some(9)).unwrap();
        let second = validator.run(shuffled, Some(9)).unwrap();

        let parameters = |run: &CrossValidation<f64>| -> Vec<String> {
            run.folds.iter().map(|f| f.parameter.clone()).collect()
        };
        assert_eq!(parameters(&first), parameters(&second));
        assert_eq!(first.concatenate(), second.concatenate());
    }

    #[test]
    fn test_drawn_seed_is_recorded_and_reproducible() {
        let validator = KFoldValidator::new(3);
        let run = validator.run(uniform_items(9), None).unwrap();
        let replay = validator.run(uniform_items(9), Some(run.seed)).unwrap();

        let members = |run: &CrossValidation<f64>| -> Vec<Vec<String>> {
            run.folds
                .iter()
                .map(|f| f.results.keys().cloned().collect())
                .collect()
        };
        assert_eq!(members(&run), members(&replay));
    }

    #[test]
    fn test_zero_folds_rejected() {
        let err = KFoldValidator::new(0)
            .cross_validate(uniform_items(4), Some(1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFoldCount(0)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let items = vec![item("q1", &[("x", 1.0)]), item("q1", &[("x", 0.5)])];
        let err = KFoldValidator::new(2).cross_validate(items, Some(1)).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateItem(name) if name == "q1"));
    }

    #[test]
    fn test_single_fold_has_nothing_to_train_on() {
        let err = KFoldValidator::new(1)
            .cross_validate(uniform_items(4), Some(1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NoParameters { fold: 0 }));
    }

    #[test]
    fn test_no_items_no_results() {
        let results = KFoldValidator::new(5)
            .cross_validate(Vec::new(), Some(1))
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_summarize_uses_configured_summarizer() {
        let validator = KFoldValidator::new(2).with_summarizer(Median);
        assert_eq!(validator.summarize(&[1.0, 2.0, 10.0]), 2.0);

        let results = BTreeMap::from([("a".to_string(), 1.0), ("b".to_string(), 3.0)]);
        assert_eq!(KFoldValidator::new(2).summarize_results(&results), 2.0);
    }
}

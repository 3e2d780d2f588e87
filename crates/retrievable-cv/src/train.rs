//! Best-parameter selection.

use crate::summary::{Mean, Summarizer};
use crate::types::ScoredItem;
use serde::Serialize;
use std::collections::BTreeMap;

/// The winning parameter setting for a set of training items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Parameter identifier
    pub parameter: String,
    /// Summary of the parameter's training scores
    pub score: f64,
}

/// Picks the parameter setting with the best summarized score.
#[derive(Debug, Clone, Default)]
pub struct Trainer<S = Mean> {
    summarizer: S,
}

impl<S: Summarizer> Trainer<S> {
    pub fn new(summarizer: S) -> Self {
        Self { summarizer }
    }

    pub fn summarizer(&self) -> &S {
        &self.summarizer
    }

    /// Selects the best parameter setting for `items`.
    ///
    /// Scores are grouped per parameter; an item that was never scored under a
    /// parameter contributes nothing to that parameter's bucket (it is not
    /// counted as 0, unlike at test time). Each bucket is summarized and the
    /// highest summary wins. Ties go to the smallest parameter id, since
    /// buckets are visited in ascending order and only a strictly greater
    /// summary replaces the current best.
    ///
    /// Returns `None` if no item carries any score.
    pub fn train<'a>(&self, items: impl IntoIterator<Item = &'a ScoredItem>) -> Option<Selection> {
        let mut buckets: BTreeMap<&'a str, Vec<f64>> = BTreeMap::new();
        for item in items {
            for (parameter, &score) in item.parameter_scores() {
                buckets.entry(parameter.as_str()).or_default().push(score);
            }
        }

        let mut best: Option<(&str, f64)> = None;
        for (parameter, scores) in &buckets {
            let summary = self.summarizer.summarize(scores);
            if best.map_or(true, |(_, best_score)| summary > best_score) {
                best = Some((*parameter, summary));
            }
        }

        best.map(|(parameter, score)| Selection {
            parameter: parameter.to_string(),
            score,
        })
    }
}

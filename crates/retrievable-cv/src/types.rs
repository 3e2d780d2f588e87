//! Core data types.

use serde::Serialize;
use std::collections::BTreeMap;

/// An evaluated item (e.g. a query) with its score under each parameter setting.
///
/// Parameter identifiers are opaque strings, usually the name of the run file
/// the score came from. Settings need not be the same across items; a setting
/// missing for an item is simply absent from [`parameter_scores`](Self::parameter_scores).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    name: String,
    parameter_scores: BTreeMap<String, f64>,
}

impl ScoredItem {
    /// Creates a scored item.
    ///
    /// # Arguments
    ///
    /// * `name` - Identifier unique within the collection being validated
    /// * `parameter_scores` - Parameter id -> score
    pub fn new(name: impl Into<String>, parameter_scores: BTreeMap<String, f64>) -> Self {
        Self {
            name: name.into(),
            parameter_scores,
        }
    }

    /// Item identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameter scores for this item.
    pub fn parameter_scores(&self) -> &BTreeMap<String, f64> {
        &self.parameter_scores
    }

    /// Score under `parameter`, if this item was scored with it.
    pub fn score(&self, parameter: &str) -> Option<f64> {
        self.parameter_scores.get(parameter).copied()
    }
}

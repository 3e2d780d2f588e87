//! Per-item oracle: the best parameter for each item on its own.
//!
//! Picking each item's best setting after the fact is an upper bound on
//! what any parameter-selection strategy could achieve. It is not
//! cross-validated and is only meant as a reference line next to
//! cross-validated results.

use crate::summary::Summarizer;
use crate::train::Trainer;
use crate::types::ScoredItem;
use serde::Serialize;
use tracing::warn;

/// The best parameter for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleSelection {
    pub name: String,
    pub parameter: String,
    pub score: f64,
}

/// Selects the best parameter for every item independently.
///
/// Items without any score are skipped. Ties follow [`Trainer::train`].
pub fn oracle<S: Summarizer>(items: &[ScoredItem], summarizer: S) -> Vec<OracleSelection> {
    let trainer = Trainer::new(summarizer);
    items
        .iter()
        .filter_map(|item| match trainer.train(std::iter::once(item)) {
            Some(selection) => Some(OracleSelection {
                name: item.name().to_string(),
                parameter: selection.parameter,
                score: selection.score,
            }),
            None => {
                warn!(item = item.name(), "Item has no scores, skipping");
                None
            }
        })
        .collect()
}

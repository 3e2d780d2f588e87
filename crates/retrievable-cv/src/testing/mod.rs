//! Testers report a held-out fold's results under the parameter chosen in training.
//!
//! - [`ScoredTester`] - the item's own score for the parameter (0 if missing)
//! - [`RawResultTester`] - the verbatim raw output lines for the item from a [`RawStore`](crate::store::RawStore)

mod raw;
mod scored;

pub use raw::RawResultTester;
pub use scored::ScoredTester;

use crate::error::TestError;
use crate::types::ScoredItem;
use std::collections::BTreeMap;

/// Produces the observable result of each item in a fold under one parameter setting.
pub trait Tester {
    /// Per-item result type (a score, raw text, ...)
    type Output;

    /// Tests every item in `fold` under `parameter`.
    ///
    /// # Returns
    ///
    /// Item name -> result, one entry per item in `fold`.
    fn test(
        &self,
        fold: &[ScoredItem],
        parameter: &str,
    ) -> Result<BTreeMap<String, Self::Output>, TestError>;
}

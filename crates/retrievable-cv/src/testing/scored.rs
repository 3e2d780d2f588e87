use super::Tester;
use crate::error::TestError;
use crate::types::ScoredItem;
use std::collections::BTreeMap;

/// Reports each item's own score under the selected parameter.
///
/// An item never scored with that parameter gets 0. This differs from
/// training, where missing scores are left out of the parameter's bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoredTester;

impl Tester for ScoredTester {
    type Output = f64;

    fn test(
        &self,
        fold: &[ScoredItem],
        parameter: &str,
    ) -> Result<BTreeMap<String, f64>, TestError> {
        Ok(fold
            .iter()
            .map(|item| (item.name().to_string(), item.score(parameter).unwrap_or(0.0)))
            .collect())
    }
}

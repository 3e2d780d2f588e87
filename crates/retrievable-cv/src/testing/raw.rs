use super::Tester;
use crate::error::TestError;
use crate::store::RawStore;
use crate::types::ScoredItem;
use std::collections::BTreeMap;
use tracing::debug;

/// Reports the raw output lines of the selected parameter for each item.
///
/// The store member named after the parameter is read once per call. For
/// each item, lines whose first whitespace-separated token is the item name
/// are joined with newlines and trailing whitespace is trimmed. This matches
/// TREC run files, where the query id leads each line.
///
/// A missing member or an item with no lines yields an empty string.
#[derive(Debug, Clone)]
pub struct RawResultTester {
    store: RawStore,
}

impl RawResultTester {
    pub fn new(store: RawStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RawStore {
        &self.store
    }
}

impl Tester for RawResultTester {
    type Output = String;

    fn test(
        &self,
        fold: &[ScoredItem],
        parameter: &str,
    ) -> Result<BTreeMap<String, String>, TestError> {
        let content = {
            let mut store = self.store.open()?;
            store.read_member(parameter)?
        };

        if content.is_none() {
            debug!(parameter, store = %self.store.path().display(), "No raw results for parameter");
        }
        let content = content.unwrap_or_default();

        Ok(fold
            .iter()
            .map(|item| (item.name().to_string(), item_lines(&content, item.name())))
            .collect())
    }
}

fn item_lines(content: &str, item: &str) -> String {
    let lines: Vec<&str> = content
        .lines()
        .filter(|line| line.split_whitespace().next() == Some(item))
        .collect();
    lines.join("\n").trim_end().to_string()
}

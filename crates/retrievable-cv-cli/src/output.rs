//! Output formatting for cross-validation results.
//!
//! Plain output is tab-separated for piping into other tools; `--json`
//! renders the same data with per-fold detail.

use retrievable_cv::config::SUMMARY_LABEL;
use retrievable_cv::{Comparison, CrossValidation, FoldReport, OracleSelection};
use serde::Serialize;
use std::collections::BTreeMap;

/// Placeholder in the parameter column of the oracle summary row.
const NO_PARAMETER: &str = "---";

/// JSON output for a cross-validation run
#[derive(Serialize)]
pub struct JsonRun<'a, T> {
    pub seed: u64,
    pub summary: Option<f64>,
    pub folds: &'a [FoldReport<T>],
}

impl<'a, T> JsonRun<'a, T> {
    pub fn new(run: &'a CrossValidation<T>, summary: Option<f64>) -> Self {
        Self {
            seed: run.seed,
            summary,
            folds: &run.folds,
        }
    }
}

/// JSON output for a comparison between two datasets
#[derive(Serialize)]
pub struct JsonComparison<'a> {
    pub first: &'a str,
    pub second: &'a str,
    pub seed: u64,
    #[serde(flatten)]
    pub comparison: Comparison,
}

/// JSON output for oracle selections
#[derive(Serialize)]
pub struct JsonOracle<'a> {
    pub summary: Option<f64>,
    pub items: &'a [OracleSelection],
}

/// Formats any output structure as pretty JSON.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// One `name<TAB>value` line per item, plus an `all<TAB>summary` line when
/// a summary is given.
pub fn format_scores(results: &BTreeMap<String, f64>, summary: Option<f64>) -> String {
    let mut lines: Vec<String> = results
        .iter()
        .map(|(name, score)| format!("{name}\t{score}"))
        .collect();
    if let Some(summary) = summary {
        lines.push(format!("{SUMMARY_LABEL}\t{summary}"));
    }
    lines.join("\n")
}

/// One `fold<TAB>name<TAB>value` line per item, in fold order.
pub fn format_by_fold(folds: &[BTreeMap<String, f64>]) -> String {
    folds
        .iter()
        .enumerate()
        .flat_map(|(fold, results)| {
            results
                .iter()
                .map(move |(name, score)| format!("{fold}\t{name}\t{score}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Raw results, one block per item in name order.
pub fn format_raw(results: &BTreeMap<String, String>) -> String {
    results
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Both summaries followed by the p-value of the paired t-test.
pub fn format_comparison(first: &str, second: &str, comparison: &Comparison) -> String {
    [
        format!("{first}\t{}", comparison.first_summary),
        format!("{second}\t{}", comparison.second_summary),
        format!("two-tailed paired t-test p-value: {}", comparison.p_value),
    ]
    .join("\n")
}

/// One `name<TAB>parameter<TAB>score` line per item, plus
/// `all<TAB>---<TAB>summary` when a summary is given.
pub fn format_oracle(selections: &[OracleSelection], summary: Option<f64>) -> String {
    let mut lines: Vec<String> = selections
        .iter()
        .map(|s| format!("{}\t{}\t{}", s.name, s.parameter, s.score))
        .collect();
    if let Some(summary) = summary {
        lines.push(format!("{SUMMARY_LABEL}\t{NO_PARAMETER}\t{summary}"));
    }
    lines.join("\n")
}

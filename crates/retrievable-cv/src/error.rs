//! Error types for retrievable-cv.
//!
//! Lookup misses are not errors: a parameter missing for an item scores 0 in
//! the scored tester, and a missing raw-result member yields an empty string.
//! Everything here ends the run.

use thiserror::Error;

/// Errors raised while running cross-validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Fold count must be at least one
    #[error("Invalid fold count: {0} (must be at least 1)")]
    InvalidFoldCount(usize),
    /// Item names must be unique within one run
    #[error("Duplicate item name: {0}")]
    DuplicateItem(String),
    /// The training folds for a fold carry no parameter scores at all
    #[error("No scored parameters to train on for fold {fold}")]
    NoParameters { fold: usize },
    /// Testing a held-out fold failed
    #[error("Testing failed: {0}")]
    Test(#[from] StoreError),
}

/// Errors that can occur while reading a raw-result store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store path is neither a directory nor a readable file
    #[error("Raw result store not found: {0}")]
    NotFound(String),
    /// Failed to read a store file or archive member
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by a [`Tester`](crate::testing::Tester).
pub type TestError = StoreError;

/// Errors that can occur while parsing score files.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The input format needs a metric to pick the right rows
    #[error("Must specify metric for the {0} input format")]
    MissingMetric(&'static str),
    /// Line does not have the expected shape
    #[error("Malformed line {line} in {parameter}: {content:?}")]
    Malformed {
        parameter: String,
        line: usize,
        content: String,
    },
    /// Score is not a finite number
    #[error("Invalid score {value:?} on line {line} in {parameter}")]
    InvalidScore {
        parameter: String,
        line: usize,
        value: String,
    },
    /// Failed to read the source
    #[error("Failed to read {parameter}: {source}")]
    Io {
        parameter: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while comparing two cross-validated runs.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The two runs do not cover the same items
    #[error("Key mismatch: item {0:?} is not present in both result sets")]
    KeyMismatch(String),
    /// Too few paired items to run the significance test
    #[error("Significance test failed: {0}")]
    Statistic(String),
    /// Cross-validating one of the datasets failed
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

//! # retrievable-cv
//!
//! k-fold cross-validation for picking the best parameter setting among
//! several candidate runs, given precomputed per-item evaluation scores
//! (for example trec_eval output per query for many runs).
//!
//! For each fold the best setting is chosen on the remaining folds and that
//! setting's result on the held-out fold is reported, so every item ends up
//! with a score that was never used to select its own parameters.
//!
//! ## Modules
//!
//! - [`types`] - [`ScoredItem`], the unit of evaluation
//! - [`reader`] - Score file parsers (flat key/value and trec_eval output)
//! - [`partition`] - Seeded shuffle and fold splitting
//! - [`train`] - Best-parameter selection over training folds
//! - [`testing`] - Testers: scored lookup and raw-result retrieval
//! - [`store`] - Raw-result stores (directory or tar archive)
//! - [`summary`] - Summarizers (mean, median, custom reductions)
//! - [`validator`] - The k-fold orchestrator
//! - [`compare`] - Paired significance test between two cross-validated runs
//! - [`oracle`] - Per-item best parameter (upper bound)
//! - [`config`] - Defaults shared by the library and the CLI
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use retrievable_cv::{KFoldValidator, ScoredItem};
//!
//! let items: Vec<ScoredItem> = (0..10)
//!     .map(|i| {
//!         let scores = BTreeMap::from([("x".to_string(), 0.8), ("y".to_string(), 0.2)]);
//!         ScoredItem::new(format!("q{i}"), scores)
//!     })
//!     .collect();
//!
//! let validator = KFoldValidator::new(5);
//! let results = validator.cross_validate(items, Some(42)).unwrap();
//! assert!(results.values().all(|&score| score == 0.8));
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod oracle;
pub mod partition;
pub mod reader;
pub mod store;
pub mod summary;
pub mod testing;
pub mod train;
pub mod types;
pub mod validator;

pub use compare::{compare_datasets, paired_scores, Comparator, Comparison};
pub use error::{CompareError, ReadError, StoreError, TestError, ValidationError};
pub use oracle::{oracle, OracleSelection};
pub use partition::{partition, resolve_seed};
pub use reader::{InputFormat, ScoreReader};
pub use store::RawStore;
pub use summary::{Mean, Median, Summarizer};
pub use testing::{RawResultTester, ScoredTester, Tester};
pub use train::{Selection, Trainer};
pub use types::ScoredItem;
pub use validator::{CrossValidation, FoldReport, KFoldValidator};

//! Defaults shared by the library and the CLI.

/// Number of folds when none is given.
pub const DEFAULT_NUM_FOLDS: usize = 10;

/// Label of the summary row appended to per-item output.
///
/// Matches the label trec_eval uses for its own summary rows, which the trec
/// reader skips for the same reason.
pub const SUMMARY_LABEL: &str = "all";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_folds() {
        assert_eq!(DEFAULT_NUM_FOLDS, 10);
    }
}

//! Summarizers reduce a collection of scores to one number.
//!
//! The same summarizer ranks parameter settings during training and produces
//! the composite score reported for a run, so both use one aggregation rule.
//!
//! | Summarizer | Empty input |
//! |------------|-------------|
//! | [`Mean`] (default) | 0 |
//! | [`Median`] | 0 |
//! | any `Fn(&[f64]) -> f64` | closure-defined |

/// Reduction of a sequence of scores to a single summary value.
pub trait Summarizer {
    fn summarize(&self, scores: &[f64]) -> f64;
}

/// Arithmetic mean. Empty input summarizes to 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl Summarizer for Mean {
    fn summarize(&self, scores: &[f64]) -> f64 {
        scores.iter().sum::<f64>() / scores.len().max(1) as f64
    }
}

/// Median (mean of the two middle values for even lengths). Empty input summarizes to 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Median;

impl Summarizer for Median {
    fn summarize(&self, scores: &[f64]) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }

        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }
}

impl<F> Summarizer for F
where
    F: Fn(&[f64]) -> f64,
{
    fn summarize(&self, scores: &[f64]) -> f64 {
        self(scores)
    }
}

//! Score file readers.
//!
//! Each file holds the per-item scores of one parameter setting (one run).
//! Reading many files builds an item -> parameter -> score table that is
//! turned into [`ScoredItem`]s for cross-validation.
//!
//! | Format | Line shape | Metric |
//! |--------|------------|--------|
//! | [`InputFormat::Tsv`] | `item score` | ignored |
//! | [`InputFormat::Trec`] | `metric item score` (trec_eval `-q`) | required |
//!
//! For trec_eval output, only lines for the requested metric are kept (case
//! insensitive) and the `all` summary row is skipped.

use crate::config::SUMMARY_LABEL;
use crate::error::ReadError;
use crate::types::ScoredItem;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Layout of a score file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Whitespace-separated `item score` pairs, one per line
    Tsv,
    /// trec_eval per-query output: `metric item score`
    Trec,
}

impl InputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tsv => "tsv",
            Self::Trec => "trec",
        }
    }

    /// Whether a metric must be given to pick rows from the file.
    pub fn requires_metric(&self) -> bool {
        matches!(self, Self::Trec)
    }
}

/// Accumulates scores from many files, one parameter setting per file.
#[derive(Debug, Clone)]
pub struct ScoreReader {
    format: InputFormat,
    scores: BTreeMap<String, BTreeMap<String, f64>>,
    next_parameter: usize,
}

impl ScoreReader {
    pub fn new(format: InputFormat) -> Self {
        Self {
            format,
            scores: BTreeMap::new(),
            next_parameter: 0,
        }
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }

    /// Reads one score file.
    ///
    /// # Arguments
    ///
    /// * `source` - The file contents
    /// * `metric` - Metric to extract; required by [`InputFormat::Trec`]
    /// * `parameter_id` - Identifier for this file's parameter setting. When
    ///   `None`, ids `"0"`, `"1"`, ... are assigned in call order.
    ///
    /// # Returns
    ///
    /// The parameter id the scores were stored under.
    pub fn read<R: BufRead>(
        &mut self,
        source: R,
        metric: Option<&str>,
        parameter_id: Option<&str>,
    ) -> Result<String, ReadError> {
        let metric = match (self.format, metric) {
            (InputFormat::Trec, None) => return Err(ReadError::MissingMetric(self.format.name())),
            (_, metric) => metric,
        };

        let parameter = match parameter_id {
            Some(id) => id.to_string(),
            None => {
                let id = self.next_parameter.to_string();
                self.next_parameter += 1;
                id
            }
        };

        for (index, line) in source.lines().enumerate() {
            let line = line.map_err(|source| ReadError::Io {
                parameter: parameter.clone(),
                source,
            })?;
            let line_number = index + 1;

            let parsed = match self.format {
                InputFormat::Tsv => parse_tsv_line(&line, &parameter, line_number)?,
                InputFormat::Trec => {
                    parse_trec_line(&line, metric.unwrap_or_default(), &parameter, line_number)?
                }
            };

            if let Some((item, score)) = parsed {
                self.scores
                    .entry(item.to_string())
                    .or_default()
                    .insert(parameter.clone(), score);
            }
        }

        Ok(parameter)
    }

    /// Reads a score file from disk, using its file name as the parameter id.
    pub fn read_path(&mut self, path: &Path, metric: Option<&str>) -> Result<String, ReadError> {
        let parameter = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let file = File::open(path).map_err(|source| ReadError::Io {
            parameter: path.display().to_string(),
            source,
        })?;

        self.read(BufReader::new(file), metric, Some(&parameter))
    }

    /// Number of distinct items read so far.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The scores read so far, one [`ScoredItem`] per item name.
    pub fn scored_items(&self) -> Vec<ScoredItem> {
        self.scores
            .iter()
            .map(|(name, scores)| ScoredItem::new(name.clone(), scores.clone()))
            .collect()
    }
}

fn parse_tsv_line<'a>(
    line: &'a str,
    parameter: &str,
    line_number: usize,
) -> Result<Option<(&'a str, f64)>, ReadError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [] => Ok(None),
        [item, value] => Ok(Some((*item, parse_score(value, parameter, line_number)?))),
        _ => Err(ReadError::Malformed {
            parameter: parameter.to_string(),
            line: line_number,
            content: line.to_string(),
        }),
    }
}

fn parse_trec_line<'a>(
    line: &'a str,
    metric: &str,
    parameter: &str,
    line_number: usize,
) -> Result<Option<(&'a str, f64)>, ReadError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 || !parts[0].eq_ignore_ascii_case(metric) || parts[1] == SUMMARY_LABEL {
        return Ok(None);
    }
    Ok(Some((parts[1], parse_score(parts[2], parameter, line_number)?)))
}

fn parse_score(value: &str, parameter: &str, line_number: usize) -> Result<f64, ReadError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
        .ok_or_else(|| ReadError::InvalidScore {
            parameter: parameter.to_string(),
            line: line_number,
            value: value.to_string(),
        })
}

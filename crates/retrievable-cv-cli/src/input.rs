//! Input discovery for score files.
//!
//! `-f` names single score files; `-d` names directories or tar(.gz)
//! archives of score files. Every file is one parameter setting, identified
//! by its file name.

use anyhow::{bail, Context, Result};
use retrievable_cv::{InputFormat, RawStore, ScoreReader, StoreError};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where score files come from.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    pub files: &'a [PathBuf],
    pub directories: &'a [PathBuf],
}

/// Reads every score file reachable from `sources`.
///
/// Paths that do not exist are skipped with a warning.
///
/// # Errors
///
/// - The format needs a metric and none was given
/// - A score file cannot be read or parsed
/// - Nothing was read at all
pub fn load_scores(
    sources: Sources<'_>,
    format: InputFormat,
    metric: Option<&str>,
) -> Result<ScoreReader> {
    if format.requires_metric() && metric.is_none() {
        bail!(
            "Must specify a metric (-m) for the {} input format",
            format.name()
        );
    }

    let mut reader = ScoreReader::new(format);

    for file in sources.files {
        if !file.is_file() {
            warn!("Skipping {}: not a file", file.display());
            continue;
        }
        reader
            .read_path(file, metric)
            .with_context(|| format!("Failed to read {}", file.display()))?;
    }

    for directory in sources.directories {
        read_store(&mut reader, directory, metric)?;
    }

    if reader.is_empty() {
        bail!("Requires at least one score file with scored items to run");
    }

    info!("Loaded scores for {} items", reader.len());
    Ok(reader)
}

fn read_store(reader: &mut ScoreReader, path: &Path, metric: Option<&str>) -> Result<()> {
    let store = match RawStore::detect(path) {
        Ok(store) => store,
        Err(StoreError::NotFound(_)) => {
            warn!("Skipping {}: no such directory or archive", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = 0usize;
    store
        .open()?
        .for_each_member(|name, member| {
            reader
                .read(BufReader::new(member), metric, Some(name))
                .with_context(|| format!("Failed to read {} in {}", name, path.display()))?;
            files += 1;
            Ok::<_, anyhow::Error>(())
        })
        .with_context(|| format!("Failed to load scores from {}", path.display()))?;

    info!("Read {} score files from {}", files, path.display());
    Ok(())
}

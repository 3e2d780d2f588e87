//! run-cv - k-fold cross-validation over per-item evaluation scores.
//!
//! # Usage
//!
//! ```bash
//! # Cross-validate trec_eval -q output for a grid of runs
//! run-cv -d evals/ -m map -k 10 -s
//!
//! # Score files packed in an archive, fixed seed
//! run-cv -d evals.tar.gz -m ndcg_cut_20 -r 42
//!
//! # Emit the raw run lines of the selected parameters instead of scores
//! run-cv -d evals/ -m map --raw-dir runs/
//!
//! # Compare two collections with a paired t-test
//! run-cv -d evals/a -m map --other-directory evals/b
//!
//! # Per-item oracle (upper bound)
//! run-cv -d evals/ -m map --oracle -s
//! ```

mod input;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use input::Sources;
use retrievable_cv::config::DEFAULT_NUM_FOLDS;
use retrievable_cv::{
    compare_datasets, oracle, resolve_seed, InputFormat, KFoldValidator, Mean, RawResultTester,
    RawStore, ScoredItem, Summarizer,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Score file formats accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// `item score` per line
    Tsv,
    /// trec_eval -q output: `metric item score`
    Trec,
}

impl From<Format> for InputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Tsv => InputFormat::Tsv,
            Format::Trec => InputFormat::Trec,
        }
    }
}

/// Run cross-validation.
///
/// Each score file holds per-item scores for one parameter setting. For
/// every fold the best setting is chosen on the other folds, and its scores
/// on the held-out items are reported.
#[derive(Parser)]
#[command(name = "run-cv", version, about)]
struct Cli {
    /// A score file to include; either this or -d must be given
    #[arg(short = 'f', long = "file")]
    files: Vec<PathBuf>,

    /// A directory or tar(.gz) archive of score files; either this or -f must be given
    #[arg(short = 'd', long = "directory")]
    directories: Vec<PathBuf>,

    /// Number of folds
    #[arg(short = 'k', long, default_value_t = DEFAULT_NUM_FOLDS)]
    folds: usize,

    /// Seed for item shuffling (drawn and logged when omitted)
    #[arg(short = 'r', long)]
    seed: Option<u64>,

    /// Include the summary statistic
    #[arg(short, long)]
    summarize: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Metric to optimize; required for the trec format
    #[arg(short, long)]
    metric: Option<String>,

    /// Input file format
    #[arg(short, long, value_enum, default_value_t = Format::Trec)]
    input_format: Format,

    /// Directory or archive of raw results (one file per parameter) to output instead of scores
    #[arg(long, conflicts_with_all = ["other_directories", "oracle"])]
    raw_dir: Option<PathBuf>,

    /// A second directory or archive of score files to compare against
    #[arg(
        long = "other-directory",
        requires = "directories",
        conflicts_with = "oracle"
    )]
    other_directories: Vec<PathBuf>,

    /// Report results per fold as `fold<TAB>item<TAB>score`
    #[arg(long, conflicts_with_all = ["raw_dir", "other_directories", "oracle"])]
    by_fold: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Report each item's best parameter chosen on the item itself (no cross-validation)
    #[arg(long)]
    oracle: bool,
}

impl Cli {
    fn sources(&self) -> Sources<'_> {
        Sources {
            files: &self.files,
            directories: &self.directories,
        }
    }

    fn load(&self, sources: Sources<'_>) -> Result<Vec<ScoredItem>> {
        let reader =
            input::load_scores(sources, self.input_format.into(), self.metric.as_deref())?;
        Ok(reader.scored_items())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let output = if cli.oracle {
        run_oracle(&cli)?
    } else if let Some(raw_dir) = &cli.raw_dir {
        run_raw(&cli, raw_dir)?
    } else if !cli.other_directories.is_empty() {
        run_comparison(&cli)?
    } else {
        run_scores(&cli)?
    };

    println!("{}", output);
    Ok(())
}

fn run_scores(cli: &Cli) -> Result<String> {
    let items = cli.load(cli.sources())?;
    let validator = KFoldValidator::new(cli.folds);
    let run = validator.run(items, cli.seed)?;

    if cli.json {
        let summary = cli
            .summarize
            .then(|| validator.summarize_results(&run.clone().concatenate()));
        return Ok(output::format_json(&output::JsonRun::new(&run, summary)));
    }

    if cli.by_fold {
        return Ok(output::format_by_fold(&run.by_fold()));
    }

    let results = run.concatenate();
    let summary = cli
        .summarize
        .then(|| validator.summarize_results(&results));
    Ok(output::format_scores(&results, summary))
}

fn run_raw(cli: &Cli, raw_dir: &Path) -> Result<String> {
    let items = cli.load(cli.sources())?;
    let store = RawStore::detect(raw_dir)
        .with_context(|| format!("Raw results not found at {}", raw_dir.display()))?;
    let validator = KFoldValidator::new(cli.folds).with_tester(RawResultTester::new(store));
    let run = validator.run(items, cli.seed)?;

    if cli.json {
        return Ok(output::format_json(&output::JsonRun::new(&run, None)));
    }
    Ok(output::format_raw(&run.concatenate()))
}

fn run_comparison(cli: &Cli) -> Result<String> {
    let first = cli.load(cli.sources())?;
    let second = cli.load(Sources {
        files: &cli.files,
        directories: &cli.other_directories,
    })?;

    let seed = resolve_seed(cli.seed);
    let comparison = compare_datasets(&KFoldValidator::new(cli.folds), first, second, Some(seed))?;

    let first_label = label(&cli.directories);
    let second_label = label(&cli.other_directories);
    if cli.json {
        return Ok(output::format_json(&output::JsonComparison {
            first: &first_label,
            second: &second_label,
            seed,
            comparison,
        }));
    }
    Ok(output::format_comparison(
        &first_label,
        &second_label,
        &comparison,
    ))
}

fn run_oracle(cli: &Cli) -> Result<String> {
    let items = cli.load(cli.sources())?;
    let selections = oracle(&items, Mean);
    let summary = cli.summarize.then(|| {
        let scores: Vec<f64> = selections.iter().map(|s| s.score).collect();
        Mean.summarize(&scores)
    });

    if cli.json {
        return Ok(output::format_json(&output::JsonOracle {
            summary,
            items: &selections,
        }));
    }
    Ok(output::format_oracle(&selections, summary))
}

/// Names a dataset by its first input path.
fn label(paths: &[PathBuf]) -> String {
    paths
        .first()
        .map(|path| path.display().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["run-cv", "-d", "evals", "-m", "map"]);

        assert_eq!(cli.folds, DEFAULT_NUM_FOLDS);
        assert!(matches!(cli.input_format, Format::Trec));
        assert_eq!(cli.seed, None);
        assert_eq!(cli.metric.as_deref(), Some("map"));
    }

    #[test]
    fn test_repeated_inputs() {
        let cli = Cli::parse_from([
            "run-cv", "-f", "a", "-f", "b", "-d", "c", "-i", "tsv", "-k", "5", "-r", "42",
        ]);

        assert_eq!(cli.files, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(cli.directories, vec![PathBuf::from("c")]);
        assert!(matches!(cli.input_format, Format::Tsv));
        assert_eq!(cli.folds, 5);
        assert_eq!(cli.seed, Some(42));
    }

    #[test]
    fn test_comparison_needs_a_first_directory() {
        let result = Cli::try_parse_from(["run-cv", "-f", "a", "--other-directory", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_and_oracle_conflict() {
        let result =
            Cli::try_parse_from(["run-cv", "-d", "a", "--raw-dir", "runs", "--oracle"]);
        assert!(result.is_err());
    }

    /// Writes a tsv score file with one line per item `q1..=q6`.
    fn write_scores(dir: &Path, parameter: &str, score: impl Fn(usize) -> f64) {
        let content: String = (1..=6).map(|q| format!("q{q}\t{}\n", score(q))).collect();
        std::fs::write(dir.join(parameter), content).unwrap();
    }

    fn arg(path: &Path) -> String {
        path.display().to_string()
    }

    #[test]
    fn test_end_to_end_scores() {
        let dir = tempfile::tempdir().unwrap();
        write_scores(dir.path(), "good", |_| 0.5);
        write_scores(dir.path(), "bad", |_| 0.25);
        let dir_arg = arg(dir.path());
        let cli = Cli::parse_from([
            "run-cv", "-d", dir_arg.as_str(), "-i", "tsv", "-k", "3", "-r", "1", "-s",
        ]);

        let output = run_scores(&cli).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "q1\t0.5");
        assert_eq!(lines[6], "all\t0.5");
    }

    #[test]
    fn test_end_to_end_raw() {
        let scores = tempfile::tempdir().unwrap();
        write_scores(scores.path(), "good", |_| 0.5);
        write_scores(scores.path(), "bad", |_| 0.25);

        let runs = tempfile::tempdir().unwrap();
        for parameter in ["good", "bad"] {
            let content: String = (1..=6)
                .map(|q| format!("q{q} Q0 {parameter}-doc 1 1.0 {parameter}\n"))
                .collect();
            std::fs::write(runs.path().join(parameter), content).unwrap();
        }

        let (scores_arg, runs_arg) = (arg(scores.path()), arg(runs.path()));
        let cli = Cli::parse_from([
            "run-cv",
            "-d",
            scores_arg.as_str(),
            "-i",
            "tsv",
            "-k",
            "3",
            "-r",
            "1",
            "--raw-dir",
            runs_arg.as_str(),
        ]);

        let output = run_raw(&cli, runs.path()).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "q1 Q0 good-doc 1 1.0 good");
        assert_eq!(lines[5], "q6 Q0 good-doc 1 1.0 good");
    }

    #[test]
    fn test_end_to_end_comparison() {
        let first = tempfile::tempdir().unwrap();
        write_scores(first.path(), "good", |_| 0.5);
        write_scores(first.path(), "bad", |_| 0.0);

        let second = tempfile::tempdir().unwrap();
        write_scores(second.path(), "good", |q| 0.0625 * q as f64);
        write_scores(second.path(), "bad", |_| 0.0);

        let (first_arg, second_arg) = (arg(first.path()), arg(second.path()));
        let cli = Cli::parse_from([
            "run-cv",
            "-d",
            first_arg.as_str(),
            "--other-directory",
            second_arg.as_str(),
            "-i",
            "tsv",
            "-k",
            "3",
        ]);

        let output = run_comparison(&cli).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("{first_arg}\t0.5"));
        assert_eq!(lines[1], format!("{second_arg}\t0.21875"));
        let p_value: f64 = lines[2]
            .strip_prefix("two-tailed paired t-test p-value: ")
            .unwrap()
            .parse()
            .unwrap();
        assert!(p_value.is_finite() && p_value < 0.05);
    }

    #[test]
    fn test_comparison_of_identical_datasets_still_reports() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for dir in [first.path(), second.path()] {
            write_scores(dir, "good", |_| 0.5);
            write_scores(dir, "bad", |_| 0.25);
        }

        let (first_arg, second_arg) = (arg(first.path()), arg(second.path()));
        let cli = Cli::parse_from([
            "run-cv",
            "-d",
            first_arg.as_str(),
            "--other-directory",
            second_arg.as_str(),
            "-i",
            "tsv",
            "-k",
            "2",
            "-r",
            "9",
        ]);

        let output = run_comparison(&cli).unwrap();

        assert_eq!(
            output,
            format!("{first_arg}\t0.5\n{second_arg}\t0.5\ntwo-tailed paired t-test p-value: NaN")
        );
    }

    #[test]
    fn test_end_to_end_oracle() {
        let dir = tempfile::tempdir().unwrap();
        write_scores(dir.path(), "odd", |q| if q % 2 == 1 { 0.5 } else { 0.25 });
        write_scores(dir.path(), "even", |q| if q % 2 == 0 { 0.5 } else { 0.25 });
        let dir_arg = arg(dir.path());
        let cli = Cli::parse_from(["run-cv", "-d", dir_arg.as_str(), "-i", "tsv", "--oracle", "-s"]);

        let output = run_oracle(&cli).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "q1\todd\t0.5");
        assert_eq!(lines[1], "q2\teven\t0.5");
        assert_eq!(lines[6], "all\t---\t0.5");
    }
}

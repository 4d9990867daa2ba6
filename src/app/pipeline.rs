//! Shared scoring workflow used by both CLI and TUI front-ends.
//!
//! resolve package -> load + validate -> build scorer -> score (single / batch)
//!
//! The front-ends only decide how results are presented.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::{Applicant, ModelChoice, ScoreConfig, ScoredResult};
use crate::error::AppError;
use crate::io::{default_output_path, load_batch, write_scored_csv_file, BatchTable};
use crate::package::{load_package, resolve_model_path, ModelPackage};
use crate::report::{summarize_batch, BatchSummary};
use crate::scoring::{RowScore, Scorer};

/// A validated package and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub path: PathBuf,
    pub package: ModelPackage,
}

/// Resolve and load the model package once for the whole process.
pub fn open_package(explicit: Option<&Path>) -> Result<LoadedModel, AppError> {
    let path = resolve_model_path(explicit)?;
    let package = load_package(&path)?;
    Ok(LoadedModel { path, package })
}

/// Score a single form applicant.
pub fn predict(package: &ModelPackage, config: &ScoreConfig, applicant: &Applicant) -> Result<ScoredResult, AppError> {
    let scorer = Scorer::new(package, config)?;
    let result = scorer.score_applicant(applicant)?;
    info!(
        model = result.model.tag(),
        probability = result.probability,
        class = result.class(),
        "scored applicant"
    );
    Ok(result)
}

/// All outputs of one `risk batch` run.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub table: BatchTable,
    pub scores: Vec<RowScore>,
    pub summary: BatchSummary,
    pub output: PathBuf,
    pub model: ModelChoice,
    pub threshold: f64,
}

/// Load a CSV, score every row, and write the scored table.
pub fn run_batch(
    package: &ModelPackage,
    config: &ScoreConfig,
    input: &Path,
    output: Option<&Path>,
) -> Result<BatchOutput, AppError> {
    let scorer = Scorer::new(package, config)?;
    let table = load_batch(input, package)?;

    let scores = scorer.score_batch(&table.rows).map_err(|e| {
        AppError::new(
            2,
            format!("Batch aborted, no output written: {e} ({})", input.display()),
        )
    })?;

    let output = output.map(Path::to_path_buf).unwrap_or_else(|| default_output_path(input));
    write_scored_csv_file(&output, &table, &scores)?;

    let summary = summarize_batch(&scores);
    if !summary.issues.is_empty() {
        warn!(unscored = summary.issues.len(), "batch rows left unscored");
    }
    info!(rows = summary.rows, scored = summary.scored, output = %output.display(), "wrote scored batch");

    Ok(BatchOutput {
        table,
        scores,
        summary,
        output,
        model: scorer.variant().choice,
        threshold: scorer.threshold(),
    })
}

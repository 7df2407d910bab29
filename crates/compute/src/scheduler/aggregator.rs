//! Scoring of finished decoys and the single-decoy fold-back.

use std::path::{Path, PathBuf};

use decoy_core::{ScoreFunction, Task, TaskId, TaskStatus, WorkState};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::artifact::read_artifact;
use super::score_file::ScoreFile;
use crate::error::BatchError;

/// One scored decoy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDecoy {
    pub task_id: TaskId,
    pub output_path: PathBuf,
    pub score: f64,
    pub status: TaskStatus,
}

/// Scores of every decoy that produced an artifact, in task id order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub score_file: PathBuf,
    pub entries: Vec<ScoredDecoy>,
}

impl AggregateResult {
    /// Lowest-scoring decoy.
    pub fn best(&self) -> Option<&ScoredDecoy> {
        self.entries
            .iter()
            .min_by(|a, b| a.score.total_cmp(&b.score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Score every decoy with an artifact and rewrite the score file.
///
/// Artifacts are loaded and scored in parallel; lines are then written in
/// task id order. The file is truncated first, so it always holds exactly
/// one line per entry of the returned result.
///
/// Lines from earlier runs are not kept: a decoy outside `tasks`, or one
/// whose artifact no longer loads, disappears from the file even if a
/// previous run scored it.
pub fn finalize<S: WorkState>(
    tasks: &[Task],
    score_file: &Path,
    score_fn: &dyn ScoreFunction<S>,
) -> Result<AggregateResult, BatchError> {
    let scored: Vec<Option<ScoredDecoy>> = tasks
        .par_iter()
        .filter(|t| t.status().has_artifact())
        .map(|t| match read_artifact::<S>(t.output_path()) {
            Ok(state) => Some(ScoredDecoy {
                task_id: t.id,
                output_path: t.output_path.clone(),
                score: score_fn.score(&state),
                status: t.status(),
            }),
            Err(e) => {
                warn!(task = t.id, error = %e, "skipping unreadable artifact");
                None
            }
        })
        .collect();
    let entries: Vec<ScoredDecoy> = scored.into_iter().flatten().collect();

    let io_err = |source| BatchError::ScoreFile {
        path: score_file.to_path_buf(),
        source,
    };
    let writer = ScoreFile::create(score_file).map_err(io_err)?;
    for entry in &entries {
        writer.append(&entry.output_path, entry.score).map_err(io_err)?;
    }
    writer.finish().map_err(io_err)?;

    info!(
        score_file = %score_file.display(),
        scored = entries.len(),
        score_fn = score_fn.name(),
        "score file written"
    );

    Ok(AggregateResult {
        score_file: score_file.to_path_buf(),
        entries,
    })
}

/// For a one-decoy batch, replace `primary` with the produced state.
///
/// Only a decoy that made it into `aggregate` is folded back. Returns `false`
/// (and leaves `primary` alone) otherwise, or when its artifact no longer
/// loads.
pub fn fold_single_result<S: WorkState>(
    tasks: &[Task],
    aggregate: &AggregateResult,
    primary: &mut S,
) -> bool {
    let [task] = tasks else {
        return false;
    };
    if !aggregate.entries.iter().any(|e| e.task_id == task.id) {
        warn!(task = task.id, status = ?task.status(), "single decoy produced nothing to fold back");
        return false;
    }

    match read_artifact::<S>(task.output_path()) {
        Ok(produced) => {
            *primary = produced;
            info!(task = task.id, "folded single decoy back into primary state");
            true
        }
        Err(e) => {
            warn!(task = task.id, error = %e, "cannot load single decoy for fold-back");
            false
        }
    }
}

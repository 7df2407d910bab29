use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::task::{Task, TaskId};

/// Resolved on-disk naming for one batch: artifacts, snapshots and the
/// score file. Built once when the scheduler is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLayout {
    directory: PathBuf,
    basename: String,
    extension: String,
    score_file: PathBuf,
}

impl OutputLayout {
    pub fn new(
        directory: impl Into<PathBuf>,
        basename: impl Into<String>,
        extension: impl Into<String>,
        score_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            directory: directory.into(),
            basename: basename.into(),
            extension: extension.into(),
            score_file: score_file.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn score_file(&self) -> &Path {
        &self.score_file
    }

    /// `{directory}/{basename}_decoy_{id}.{extension}`
    pub fn artifact_path(&self, id: TaskId) -> PathBuf {
        self.directory
            .join(format!("{}_decoy_{}.{}", self.basename, id, self.extension))
    }

    /// Hidden per-decoy snapshot handed to out-of-process workers.
    pub fn snapshot_path(&self, id: TaskId) -> PathBuf {
        self.directory
            .join(format!(".{}_decoy_{}.snapshot.json", self.basename, id))
    }

    /// The fixed task set for `count` decoys, ids `1..=count`.
    pub fn build_tasks(&self, count: usize) -> Vec<Task> {
        (1..=count)
            .map(|id| Task::new(id, self.artifact_path(id)))
            .collect()
    }
}

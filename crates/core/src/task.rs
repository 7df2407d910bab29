use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// 1-based decoy index. Decoy `i` writes `{basename}_decoy_{i}.{ext}`.
pub type TaskId = usize;

/// Lifecycle of a single decoy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not launched yet (or every launch attempt so far failed).
    Pending,
    /// An execution unit is working on it.
    Running,
    /// Unit exited cleanly and the artifact is on disk.
    Completed,
    /// Unit ended without leaving an artifact.
    Failed,
    /// Unit exited non-zero but the artifact is on disk anyway.
    CompletedWithWarning,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::CompletedWithWarning
        )
    }

    /// Whether the decoy produced a usable artifact.
    pub fn has_artifact(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::CompletedWithWarning)
    }

    /// Allowed edges. `Pending -> Completed` covers decoys resumed from an
    /// artifact left by an earlier run.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Pending, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
                | (TaskStatus::Running, TaskStatus::CompletedWithWarning)
        )
    }
}

/// One unit of work: a decoy and where its artifact goes.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub output_path: PathBuf,
    status: TaskStatus,
    exit_code: Option<i32>,
    resumed: bool,
    launched_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: TaskId, output_path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            output_path: output_path.into(),
            status: TaskStatus::Pending,
            exit_code: None,
            resumed: false,
            launched_at: None,
            finished_at: None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Exit code reported by the execution unit, once it has ended.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// True when the artifact already existed and the decoy was never launched.
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn artifact_exists(&self) -> bool {
        self.output_path.is_file()
    }

    /// Wall time between launch and the poll that observed completion.
    pub fn duration(&self) -> Option<Duration> {
        let (start, end) = (self.launched_at?, self.finished_at?);
        end.signed_duration_since(start).to_std().ok()
    }

    pub fn mark_running(&mut self) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Running)?;
        self.launched_at = Some(Utc::now());
        Ok(())
    }

    /// Mark a pending decoy complete because its artifact is already on disk.
    pub fn mark_resumed(&mut self) -> Result<(), TransitionError> {
        if self.status != TaskStatus::Pending {
            return Err(self.invalid(TaskStatus::Completed));
        }
        self.transition(TaskStatus::Completed)?;
        self.resumed = true;
        Ok(())
    }

    /// Record the terminal status of a running decoy.
    pub fn finish(&mut self, status: TaskStatus, exit_code: i32) -> Result<(), TransitionError> {
        if self.status != TaskStatus::Running || !status.is_terminal() {
            return Err(self.invalid(status));
        }
        self.transition(status)?;
        self.exit_code = Some(exit_code);
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    fn transition(&mut self, next: TaskStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(self.invalid(next));
        }
        self.status = next;
        Ok(())
    }

    fn invalid(&self, to: TaskStatus) -> TransitionError {
        TransitionError {
            task: self.id,
            from: self.status,
            to,
        }
    }
}

/// Count tasks currently in `status`.
pub fn count_status(tasks: &[Task], status: TaskStatus) -> usize {
    tasks.iter().filter(|t| t.status == status).count()
}

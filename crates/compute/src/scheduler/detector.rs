use decoy_core::{Task, TaskStatus};
use tracing::warn;

use super::launcher::{UnitHandle, UnitState};
use super::unit::EXIT_OK;

/// Outcome of polling one running decoy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    StillRunning,
    Completed,
    /// Unit exited non-zero but its artifact is on disk.
    CompletedWithWarning { exit_code: i32 },
    /// Unit ended without an artifact. Permanent, never retried.
    Failed { exit_code: i32 },
}

impl Completion {
    /// Terminal status and exit code, or `None` while still running.
    pub fn terminal(self) -> Option<(TaskStatus, i32)> {
        match self {
            Completion::StillRunning => None,
            Completion::Completed => Some((TaskStatus::Completed, EXIT_OK)),
            Completion::CompletedWithWarning { exit_code } => {
                Some((TaskStatus::CompletedWithWarning, exit_code))
            }
            Completion::Failed { exit_code } => Some((TaskStatus::Failed, exit_code)),
        }
    }
}

/// Decision rule, in order: alive, artifact with zero exit, artifact with
/// non-zero exit, no artifact.
pub fn classify(state: UnitState, artifact_present: bool) -> Completion {
    match state {
        UnitState::Alive => Completion::StillRunning,
        UnitState::Exited(EXIT_OK) if artifact_present => Completion::Completed,
        UnitState::Exited(exit_code) if artifact_present => {
            Completion::CompletedWithWarning { exit_code }
        }
        UnitState::Exited(exit_code) => Completion::Failed { exit_code },
    }
}

/// Poll a running decoy's unit and check for its artifact.
///
/// The artifact is only looked at once the unit has ended, so a decoy is
/// never reported complete while its unit may still be writing.
pub fn poll(task: &Task, handle: &mut dyn UnitHandle) -> Completion {
    let state = handle.poll_exit();
    let artifact_present = matches!(state, UnitState::Exited(_)) && task.artifact_exists();
    let completion = classify(state, artifact_present);

    match completion {
        Completion::CompletedWithWarning { exit_code } => warn!(
            task = task.id,
            exit_code,
            output = %task.output_path.display(),
            "decoy exited non-zero but left an artifact; keeping it"
        ),
        Completion::Failed { exit_code } => warn!(
            task = task.id,
            exit_code,
            output = %task.output_path.display(),
            "decoy ended without an artifact"
        ),
        _ => {}
    }
    completion
}

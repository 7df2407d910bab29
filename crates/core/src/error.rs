use thiserror::Error;

use crate::task::{TaskId, TaskStatus};

/// Invalid or unreadable batch configuration. Always fatal, raised before
/// any decoy is launched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised by a transform while it mutates a decoy's private state.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("transform failed: {0}")]
    Failed(String),

    #[error("state rejected by transform: {0}")]
    InvalidState(String),
}

/// A status change that would break the Pending -> Running -> terminal ordering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("task {task}: invalid status transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub task: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

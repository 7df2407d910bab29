use std::path::PathBuf;

use decoy_core::{ConfigError, TaskId, TransformError};
use thiserror::Error;

use crate::registry::RegistryError;

/// Reading or writing a serialized state (artifact or snapshot).
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact encoding error at {path}: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Spawning an execution unit failed. The task stays pending and the
/// scheduler retries it on its next pass.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to spawn unit for decoy {task}: {source}")]
    Spawn {
        task: TaskId,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write snapshot for decoy {task}: {source}")]
    Snapshot {
        task: TaskId,
        #[source]
        source: ArtifactError,
    },
}

/// Failure inside an execution unit. Surfaces only as a non-zero exit code.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors surfaced to the caller of a batch. Task-level failures never
/// appear here; they are recorded on the task and in the metrics.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot prepare output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write score file {path}: {source}")]
    ScoreFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),
}

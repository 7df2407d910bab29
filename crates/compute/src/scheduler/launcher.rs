//! Execution units: spawning them and checking whether they are still alive.
//!
//! Two isolation strategies sit behind the [`Launcher`] trait. A thread unit
//! clones the snapshot in memory; a process unit runs the `decoy-worker`
//! binary against a snapshot file. Either way the scheduler only sees a
//! [`UnitHandle`] it can poll without blocking.

use std::fs;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

use decoy_core::{Isolation, Protocol, TaskId, WorkState};
use tracing::{debug, warn};

use super::artifact::write_artifact;
use super::unit::{
    run_unit, UnitReport, UnitSpec, EXIT_FAILED, EXIT_OK, EXIT_PANICKED, EXIT_SIGNALED,
};
use crate::error::{LaunchError, UnitError};

/// Liveness of an execution unit as seen by one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Alive,
    Exited(i32),
}

/// Per-decoy completion handle.
pub trait UnitHandle: Send {
    /// Non-blocking liveness check. Once `Exited` is returned, every later
    /// call returns the same code.
    fn poll_exit(&mut self) -> UnitState;
}

/// Spawns one isolated execution unit per decoy.
pub trait Launcher<S>: Send + Sync {
    fn launch(&self, spec: UnitSpec, snapshot: S) -> Result<Box<dyn UnitHandle>, LaunchError>;
}

/// Pick the launcher matching the configured isolation.
pub fn launcher_for<S: WorkState>(
    isolation: &Isolation,
    protocol: &Protocol<S>,
) -> Box<dyn Launcher<S>> {
    match isolation {
        Isolation::Thread => Box::new(ThreadLauncher::new(protocol.clone())),
        Isolation::Process { program } => Box::new(ProcessLauncher::new(program.clone(), protocol)),
    }
}

// ── Thread isolation ────────────────────────────────────────────────

pub struct ThreadLauncher<S> {
    protocol: Protocol<S>,
}

impl<S> ThreadLauncher<S> {
    pub fn new(protocol: Protocol<S>) -> Self {
        Self { protocol }
    }
}

impl<S: WorkState> Launcher<S> for ThreadLauncher<S> {
    fn launch(&self, spec: UnitSpec, snapshot: S) -> Result<Box<dyn UnitHandle>, LaunchError> {
        let task = spec.task_id;
        let protocol = self.protocol.clone();
        let handle = thread::Builder::new()
            .name(format!("decoy_{task}"))
            .spawn(move || run_unit(&spec, &snapshot, &protocol))
            .map_err(|source| LaunchError::Spawn { task, source })?;

        Ok(Box::new(ThreadUnit {
            task,
            handle: Some(handle),
            exit: None,
        }))
    }
}

struct ThreadUnit {
    task: TaskId,
    handle: Option<JoinHandle<Result<UnitReport, UnitError>>>,
    exit: Option<i32>,
}

impl UnitHandle for ThreadUnit {
    fn poll_exit(&mut self) -> UnitState {
        if let Some(code) = self.exit {
            return UnitState::Exited(code);
        }
        if matches!(&self.handle, Some(h) if !h.is_finished()) {
            return UnitState::Alive;
        }

        let code = match self.handle.take().map(JoinHandle::join) {
            Some(Ok(Ok(_))) => EXIT_OK,
            Some(Ok(Err(e))) => {
                warn!(task = self.task, error = %e, "decoy unit failed");
                EXIT_FAILED
            }
            Some(Err(_)) => {
                warn!(task = self.task, "decoy unit panicked");
                EXIT_PANICKED
            }
            None => EXIT_FAILED,
        };
        self.exit = Some(code);
        UnitState::Exited(code)
    }
}

// ── Process isolation ───────────────────────────────────────────────

/// Runs `program` once per decoy. The program must accept the arguments of
/// [`crate::worker::WorkerArgs`].
pub struct ProcessLauncher {
    program: PathBuf,
    transform: String,
    score: String,
}

impl ProcessLauncher {
    pub fn new<S>(program: PathBuf, protocol: &Protocol<S>) -> Self {
        Self {
            program,
            transform: protocol.transform.name().to_string(),
            score: protocol.score.name().to_string(),
        }
    }

    fn command(&self, spec: &UnitSpec) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--snapshot")
            .arg(&spec.snapshot_path)
            .arg("--output")
            .arg(&spec.output_path)
            .arg("--rounds")
            .arg(spec.rounds.to_string())
            .arg("--seed")
            .arg(spec.seed.to_string())
            .arg("--task-id")
            .arg(spec.task_id.to_string())
            .arg("--transform")
            .arg(&self.transform)
            .arg("--score")
            .arg(&self.score)
            .stdin(Stdio::null());
        cmd
    }
}

impl<S: WorkState> Launcher<S> for ProcessLauncher {
    fn launch(&self, spec: UnitSpec, snapshot: S) -> Result<Box<dyn UnitHandle>, LaunchError> {
        let task = spec.task_id;
        write_artifact(&spec.snapshot_path, &snapshot)
            .map_err(|source| LaunchError::Snapshot { task, source })?;

        let child = match self.command(&spec).spawn() {
            Ok(child) => child,
            Err(source) => {
                let _ = fs::remove_file(&spec.snapshot_path);
                return Err(LaunchError::Spawn { task, source });
            }
        };
        debug!(task, pid = child.id(), program = %self.program.display(), "spawned worker process");

        Ok(Box::new(ProcessUnit {
            task,
            child,
            snapshot_path: spec.snapshot_path,
            exit: None,
        }))
    }
}

struct ProcessUnit {
    task: TaskId,
    child: Child,
    snapshot_path: PathBuf,
    exit: Option<i32>,
}

impl UnitHandle for ProcessUnit {
    fn poll_exit(&mut self) -> UnitState {
        if let Some(code) = self.exit {
            return UnitState::Exited(code);
        }

        let code = match self.child.try_wait() {
            Ok(None) => return UnitState::Alive,
            Ok(Some(status)) => status.code().unwrap_or(EXIT_SIGNALED),
            Err(e) => {
                warn!(task = self.task, error = %e, "cannot query worker process, treating it as ended");
                EXIT_SIGNALED
            }
        };

        if let Err(e) = fs::remove_file(&self.snapshot_path) {
            debug!(task = self.task, error = %e, "snapshot already gone");
        }
        self.exit = Some(code);
        UnitState::Exited(code)
    }
}

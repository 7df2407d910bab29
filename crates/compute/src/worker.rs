//! Entry point for process-isolated decoys.
//!
//! The batch side writes the shared state to a snapshot file and runs the
//! worker binary with these arguments. The worker exits 0 once the artifact
//! is in place and non-zero otherwise.

use std::path::PathBuf;

use clap::Parser;
use decoy_core::{TaskId, WorkState};
use tracing::info;

use crate::error::UnitError;
use crate::registry::ProtocolRegistry;
use crate::scheduler::artifact::read_artifact;
use crate::scheduler::unit::{UnitReport, UnitSpec, run_unit};

/// Runs one decoy: load snapshot, transform, write artifact.
#[derive(Parser, Debug, Clone)]
#[command(name = "decoy-worker", version, about)]
pub struct WorkerArgs {
    /// Serialized input state.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Where to write the produced decoy.
    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, default_value_t = 1)]
    pub rounds: u32,

    #[arg(long)]
    pub seed: u64,

    #[arg(long, default_value_t = 1)]
    pub task_id: TaskId,

    /// Registered transform name.
    #[arg(long)]
    pub transform: String,

    /// Registered score function name.
    #[arg(long)]
    pub score: String,
}

impl WorkerArgs {
    fn unit_spec(&self) -> UnitSpec {
        UnitSpec {
            task_id: self.task_id,
            rounds: self.rounds.max(1),
            seed: self.seed,
            output_path: self.output.clone(),
            snapshot_path: self.snapshot.clone(),
        }
    }
}

/// Resolve the protocol, load the snapshot and run the unit.
pub fn run_worker<S: WorkState>(
    args: &WorkerArgs,
    registry: &ProtocolRegistry<S>,
) -> Result<UnitReport, UnitError> {
    let protocol = registry.protocol(&args.transform, &args.score)?;
    let snapshot: S = read_artifact(&args.snapshot)?;
    info!(
        task = args.task_id,
        snapshot = %args.snapshot.display(),
        transform = %args.transform,
        "worker loaded snapshot"
    );
    run_unit(&args.unit_spec(), &snapshot, &protocol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::{Conformation, demo_registry};
    use crate::scheduler::artifact::write_artifact;

    fn args(dir: &std::path::Path, transform: &str) -> WorkerArgs {
        WorkerArgs::parse_from([
            "decoy-worker",
            "--snapshot",
            dir.join("snap.json").to_str().unwrap(),
            "--output",
            dir.join("out.json").to_str().unwrap(),
            "--rounds",
            "4",
            "--seed",
            "11",
            "--task-id",
            "3",
            "--transform",
            transform,
            "--score",
            "torsion_energy",
        ])
    }

    #[test]
    fn parses_arguments() {
        let a = args(std::path::Path::new("/tmp"), "small_perturbation");
        assert_eq!(a.rounds, 4);
        assert_eq!(a.seed, 11);
        assert_eq!(a.task_id, 3);
        assert_eq!(a.unit_spec().output_path, PathBuf::from("/tmp/out.json"));
    }

    #[test]
    fn runs_registered_protocol() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(&dir.path().join("snap.json"), &Conformation::extended(6, true)).unwrap();
        let registry = demo_registry().unwrap();

        run_worker(&args(dir.path(), "small_perturbation"), &registry).unwrap();
        let out: Conformation = read_artifact(&dir.path().join("out.json")).unwrap();
        assert_eq!(out.torsions.len(), 6);
    }

    #[test]
    fn unknown_transform_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(&dir.path().join("snap.json"), &Conformation::extended(2, true)).unwrap();
        let registry = demo_registry().unwrap();

        let err = run_worker(&args(dir.path(), "nope"), &registry).unwrap_err();
        assert!(matches!(err, UnitError::Registry(_)));
        assert!(!dir.path().join("out.json").exists());
    }

    #[test]
    fn missing_snapshot_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = demo_registry().unwrap();

        let err = run_worker(&args(dir.path(), "small_perturbation"), &registry).unwrap_err();
        assert!(matches!(err, UnitError::Artifact(_)));
    }
}

//! The body every execution unit runs, whether on a thread or in a worker
//! process: copy, transform `rounds` times, write the artifact.

use std::path::PathBuf;

use decoy_core::{Protocol, TaskId, WorkState, WorkerContext};
use serde::Serialize;
use tracing::{debug, info};

use super::artifact::write_artifact;
use crate::error::UnitError;

/// Exit code of a unit that finished normally.
pub const EXIT_OK: i32 = 0;
/// Exit code of a unit whose transform or artifact write returned an error.
pub const EXIT_FAILED: i32 = 1;
/// Exit code of a thread unit that panicked (same as a panicking Rust process).
pub const EXIT_PANICKED: i32 = 101;
/// Exit code reported when a process ended without one (killed by a signal).
pub const EXIT_SIGNALED: i32 = -1;

/// Everything a unit needs besides the state snapshot and the protocol.
#[derive(Debug, Clone)]
pub struct UnitSpec {
    pub task_id: TaskId,
    pub rounds: u32,
    pub seed: u64,
    pub output_path: PathBuf,
    /// Snapshot file for out-of-process units.
    pub snapshot_path: PathBuf,
}

/// Start and end score of one decoy, as logged by the unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitReport {
    pub start_score: f64,
    pub end_score: f64,
}

/// Seed for decoy `task_id`: `base + task_id` when a base seed is set,
/// fresh entropy otherwise.
pub fn unit_seed(base_seed: Option<u64>, task_id: TaskId) -> u64 {
    match base_seed {
        Some(base) => base.wrapping_add(task_id as u64),
        None => rand::random(),
    }
}

/// Apply the protocol to a private copy of `snapshot` and write the artifact.
pub fn run_unit<S: WorkState>(
    spec: &UnitSpec,
    snapshot: &S,
    protocol: &Protocol<S>,
) -> Result<UnitReport, UnitError> {
    let mut state = snapshot.clone();
    let mut ctx = WorkerContext::new(spec.task_id, spec.seed);

    let start_score = protocol.score.score(&state);
    debug!(
        task = spec.task_id,
        seed = spec.seed,
        rounds = spec.rounds,
        transform = protocol.transform.name(),
        "unit started"
    );

    for round in 1..=spec.rounds {
        ctx.set_round(round);
        protocol.transform.apply(&mut state, &mut ctx)?;
    }

    write_artifact(&spec.output_path, &state)?;

    let end_score = protocol.score.score(&state);
    info!(
        task = spec.task_id,
        output = %spec.output_path.display(),
        start_score,
        end_score,
        "decoy written"
    );

    Ok(UnitReport {
        start_score,
        end_score,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use decoy_core::{Representation, ScoreFunction, Transform, TransformError};
    use rand::Rng;
    use serde::Deserialize;

    use super::*;
    use crate::scheduler::artifact::read_artifact;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: i64,
        draws: Vec<u32>,
    }

    impl WorkState for Counter {
        fn representation(&self) -> Representation {
            Representation::Centroid
        }
    }

    struct Increment;

    impl Transform<Counter> for Increment {
        fn name(&self) -> &str {
            "increment"
        }

        fn apply(&self, state: &mut Counter, ctx: &mut WorkerContext) -> Result<(), TransformError> {
            state.value += 1;
            state.draws.push(ctx.rng().gen());
            Ok(())
        }
    }

    struct Reject;

    impl Transform<Counter> for Reject {
        fn name(&self) -> &str {
            "reject"
        }

        fn apply(&self, _: &mut Counter, _: &mut WorkerContext) -> Result<(), TransformError> {
            Err(TransformError::Failed("nope".into()))
        }
    }

    struct Value;

    impl ScoreFunction<Counter> for Value {
        fn name(&self) -> &str {
            "value"
        }

        fn score(&self, state: &Counter) -> f64 {
            state.value as f64
        }
    }

    fn spec(dir: &std::path::Path, seed: u64) -> UnitSpec {
        UnitSpec {
            task_id: 1,
            rounds: 3,
            seed,
            output_path: dir.join("c_decoy_1.json"),
            snapshot_path: dir.join(".c_decoy_1.snapshot.json"),
        }
    }

    fn start() -> Counter {
        Counter {
            value: 10,
            draws: Vec::new(),
        }
    }

    #[test]
    fn applies_rounds_and_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let protocol = Protocol::<Counter>::new(Arc::new(Increment), Arc::new(Value));
        let snapshot = start();

        let report = run_unit(&spec(dir.path(), 7), &snapshot, &protocol).unwrap();
        assert_eq!(report.start_score, 10.0);
        assert_eq!(report.end_score, 13.0);

        let written: Counter = read_artifact(&dir.path().join("c_decoy_1.json")).unwrap();
        assert_eq!(written.value, 13);
        assert_eq!(written.draws.len(), 3);
        assert_eq!(snapshot.value, 10, "snapshot must not be mutated");
    }

    #[test]
    fn same_seed_is_reproducible() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let protocol = Protocol::<Counter>::new(Arc::new(Increment), Arc::new(Value));

        run_unit(&spec(a.path(), 99), &start(), &protocol).unwrap();
        run_unit(&spec(b.path(), 99), &start(), &protocol).unwrap();

        let x: Counter = read_artifact(&a.path().join("c_decoy_1.json")).unwrap();
        let y: Counter = read_artifact(&b.path().join("c_decoy_1.json")).unwrap();
        assert_eq!(x, y);
    }

    #[test]
    fn transform_error_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let protocol = Protocol::<Counter>::new(Arc::new(Reject), Arc::new(Value));

        let err = run_unit(&spec(dir.path(), 1), &start(), &protocol).unwrap_err();
        assert!(matches!(err, UnitError::Transform(_)));
        assert!(!dir.path().join("c_decoy_1.json").exists());
    }

    #[test]
    fn seeds_from_base() {
        assert_eq!(unit_seed(Some(100), 3), 103);
        assert_eq!(unit_seed(Some(u64::MAX), 1), 0);
    }
}

use decoy_core::{Protocol, WorkState, WorkerContext};
use tracing::info;

use super::unit::UnitReport;
use crate::error::BatchError;

/// Apply the transform `rounds` times directly to `primary` on the calling
/// thread. Used when batch mode is off; no artifacts are written.
pub fn run_sequential<S: WorkState>(
    primary: &mut S,
    protocol: &Protocol<S>,
    rounds: u32,
    seed: u64,
) -> Result<UnitReport, BatchError> {
    let start_score = protocol.score.score(primary);
    info!(
        transform = protocol.transform.name(),
        rounds,
        start_score,
        "sequential run starting"
    );

    // Task id 0 marks the primary state; decoys are numbered from 1.
    let mut ctx = WorkerContext::new(0, seed);
    for round in 1..=rounds {
        info!("Round {}", round);
        ctx.set_round(round);
        protocol.transform.apply(primary, &mut ctx)?;
    }

    let end_score = protocol.score.score(primary);
    info!(start_score, end_score, "sequential run finished");

    Ok(UnitReport {
        start_score,
        end_score,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use decoy_core::{Representation, ScoreFunction, Transform, TransformError};
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Steps(Vec<u32>);

    impl WorkState for Steps {
        fn representation(&self) -> Representation {
            Representation::Centroid
        }
    }

    struct RecordRound;

    impl Transform<Steps> for RecordRound {
        fn name(&self) -> &str {
            "record_round"
        }
        fn apply(&self, s: &mut Steps, ctx: &mut WorkerContext) -> Result<(), TransformError> {
            if ctx.round() > 3 {
                return Err(TransformError::Failed("too many rounds".into()));
            }
            s.0.push(ctx.round());
            Ok(())
        }
    }

    struct Len;

    impl ScoreFunction<Steps> for Len {
        fn name(&self) -> &str {
            "len"
        }
        fn score(&self, s: &Steps) -> f64 {
            s.0.len() as f64
        }
    }

    #[test]
    fn mutates_primary_in_place() {
        let protocol = Protocol::<Steps>::new(Arc::new(RecordRound), Arc::new(Len));
        let mut primary = Steps(Vec::new());

        let report = run_sequential(&mut primary, &protocol, 3, 1).unwrap();
        assert_eq!(primary, Steps(vec![1, 2, 3]));
        assert_eq!(report.start_score, 0.0);
        assert_eq!(report.end_score, 3.0);
    }

    #[test]
    fn transform_error_is_surfaced() {
        let protocol = Protocol::<Steps>::new(Arc::new(RecordRound), Arc::new(Len));
        let mut primary = Steps(Vec::new());

        let err = run_sequential(&mut primary, &protocol, 4, 1).unwrap_err();
        assert!(matches!(err, BatchError::Transform(_)));
    }
}

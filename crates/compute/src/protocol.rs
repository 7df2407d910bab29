//! Top-level entry: run a protocol either as a decoy batch or sequentially.

use decoy_core::{Protocol, SchedulerConfig, WorkState};
use serde::Serialize;
use tracing::info;

use crate::error::BatchError;
use crate::scheduler::{AggregateResult, BatchMetrics, Scheduler, run_sequential};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Batch,
    Sequential,
}

/// What a protocol run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolReport {
    pub mode: RunMode,
    /// Score of the primary state before anything ran.
    pub start_score: f64,
    /// Score of the primary state afterwards, when it was changed.
    pub end_score: Option<f64>,
    pub aggregate: Option<AggregateResult>,
    pub metrics: Option<BatchMetrics>,
}

/// Run `protocol` against `primary`.
///
/// In batch mode `task_count` decoys are produced and scored, and `primary`
/// only changes when exactly one decoy was requested. Otherwise the transform
/// is applied to `primary` itself, `rounds_per_task` times.
pub fn run_protocol<S: WorkState>(
    config: &SchedulerConfig,
    protocol: Protocol<S>,
    primary: &mut S,
) -> Result<ProtocolReport, BatchError> {
    let start_score = protocol.score.score(primary);

    if !config.batch_mode {
        let seed = config.base_seed.unwrap_or_else(rand::random);
        let report = run_sequential(primary, &protocol, config.rounds_per_task, seed)?;
        return Ok(ProtocolReport {
            mode: RunMode::Sequential,
            start_score,
            end_score: Some(report.end_score),
            aggregate: None,
            metrics: None,
        });
    }

    let score = std::sync::Arc::clone(&protocol.score);
    let mut scheduler = Scheduler::new(config.clone(), protocol, primary);
    let aggregate = scheduler.run(primary)?;

    let folded = config.task_count == 1 && aggregate.len() == 1;
    let end_score = folded.then(|| score.score(primary));
    if let Some(best) = aggregate.best() {
        info!(
            task = best.task_id,
            score = best.score,
            output = %best.output_path.display(),
            "best decoy"
        );
    }

    Ok(ProtocolReport {
        mode: RunMode::Batch,
        start_score,
        end_score,
        aggregate: Some(aggregate),
        metrics: Some(scheduler.metrics().clone()),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::protocols::{Conformation, demo_registry};

    fn protocol(transform: &str) -> Protocol<Conformation> {
        demo_registry()
            .unwrap()
            .protocol(transform, "torsion_energy")
            .unwrap()
    }

    #[test]
    fn sequential_changes_primary_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = SchedulerConfig::new(dir.path(), "seq")
            .with_batch_mode(false)
            .with_rounds(3);
        let mut primary = Conformation {
            torsions: vec![80.0, 100.0],
            full_atom: true,
        };

        let report = run_protocol(&config, protocol("torsion_relax"), &mut primary).unwrap();
        assert_eq!(report.mode, RunMode::Sequential);
        assert!(report.end_score.unwrap() < report.start_score);
        assert!(report.aggregate.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn batch_scores_every_decoy() {
        let dir = tempfile::tempdir().unwrap();
        let config = SchedulerConfig::new(dir.path(), "b")
            .with_task_count(3)
            .with_concurrency_limit(2)
            .with_rounds(5)
            .with_base_seed(9)
            .with_poll_interval(Duration::from_millis(5));
        let mut primary = Conformation::extended(8, false);
        let before = primary.clone();

        let report = run_protocol(&config, protocol("small_perturbation"), &mut primary).unwrap();
        assert_eq!(report.mode, RunMode::Batch);
        assert_eq!(report.aggregate.as_ref().unwrap().len(), 3);
        assert_eq!(report.metrics.as_ref().unwrap().launched, 3);
        assert!(report.end_score.is_none());
        assert_eq!(primary, before);
        assert!(dir.path().join("b.sc").is_file());
    }
}

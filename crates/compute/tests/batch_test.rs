//! End-to-end batch runs on thread-isolated units: concurrency ceiling,
//! partial failure, resume, idempotent reruns and single-decoy fold-back.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use decoy_compute::protocols::{Conformation, SmallPerturbation, TorsionEnergy};
use decoy_compute::scheduler::{read_artifact, write_artifact};
use decoy_compute::scheduler::score_file::read_scores;
use decoy_compute::{RunMode, Scheduler, run_protocol};
use decoy_core::{
    Protocol, SchedulerConfig, TaskStatus, Transform, TransformError, WorkerContext,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn config(dir: &Path, decoys: usize, limit: usize) -> SchedulerConfig {
    SchedulerConfig::new(dir, "run")
        .with_task_count(decoys)
        .with_concurrency_limit(limit)
        .with_rounds(10)
        .with_base_seed(7)
        .with_poll_interval(Duration::from_millis(5))
}

fn perturbation() -> Protocol<Conformation> {
    Protocol::<Conformation>::new(
        Arc::new(SmallPerturbation::default()),
        Arc::new(TorsionEnergy::default()),
    )
}

fn artifact_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            name.starts_with("run_decoy_") && name.ends_with(".json")
        })
        .count()
}

/// Panics for one decoy, perturbs the others. Tracks how many run at once.
struct Flaky {
    inner: SmallPerturbation,
    panic_for: usize,
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Flaky {
    fn new(panic_for: usize) -> Self {
        Self {
            inner: SmallPerturbation::default(),
            panic_for,
            live: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Transform<Conformation> for Flaky {
    fn name(&self) -> &str {
        "flaky"
    }

    fn apply(&self, state: &mut Conformation, ctx: &mut WorkerContext) -> Result<(), TransformError> {
        if ctx.task_id() == self.panic_for {
            panic!("decoy {} blew up", self.panic_for);
        }
        if ctx.round() == 1 {
            let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
        }
        let result = self.inner.apply(state, ctx);
        if ctx.round() == 10 {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
        result
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn five_decoys_limit_two() {
    let dir = tempfile::tempdir().unwrap();
    let flaky = Flaky::new(0);
    let peak = Arc::clone(&flaky.peak);
    let protocol =
        Protocol::<Conformation>::new(Arc::new(flaky), Arc::new(TorsionEnergy::default()));
    let mut primary = Conformation::extended(12, true);

    let mut scheduler = Scheduler::new(config(dir.path(), 5, 2), protocol, &primary);
    let result = scheduler.run(&mut primary).unwrap();

    assert!(scheduler.metrics().peak_running <= 2);
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(artifact_count(dir.path()), 5);
    assert_eq!(result.len(), 5);

    let scores = read_scores(&dir.path().join("run.fasc")).unwrap();
    assert_eq!(scores.len(), 5);
    assert_eq!(scores[0].0, dir.path().join("run_decoy_1.json"));
}

#[test]
fn dying_decoy_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let protocol =
        Protocol::<Conformation>::new(Arc::new(Flaky::new(2)), Arc::new(TorsionEnergy::default()));
    let mut primary = Conformation::extended(6, false);

    let mut scheduler = Scheduler::new(config(dir.path(), 3, 1), protocol, &primary);
    let result = scheduler.run(&mut primary).unwrap();

    assert_eq!(artifact_count(dir.path()), 2);
    assert_eq!(result.len(), 2);
    assert_eq!(scheduler.tasks()[1].status(), TaskStatus::Failed);
    assert_eq!(scheduler.tasks()[1].exit_code(), Some(101));
    assert_eq!(scheduler.metrics().failed, 1);
    assert_eq!(read_scores(&dir.path().join("run.sc")).unwrap().len(), 2);
}

#[test]
fn preexisting_decoys_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let marker = Conformation::extended(3, true);
    for id in [1, 3] {
        write_artifact(&dir.path().join(format!("run_decoy_{id}.json")), &marker).unwrap();
    }
    let mut primary = Conformation::extended(5, true);

    let mut scheduler = Scheduler::new(config(dir.path(), 4, 2), perturbation(), &primary);
    let result = scheduler.run(&mut primary).unwrap();

    assert_eq!(scheduler.metrics().launched, 2);
    assert_eq!(scheduler.metrics().resumed, 2);
    let launched: Vec<_> = scheduler
        .tasks()
        .iter()
        .filter(|t| !t.is_resumed())
        .map(|t| t.id)
        .collect();
    assert_eq!(launched, vec![2, 4]);
    assert_eq!(result.len(), 4);

    // Resumed artifacts are left untouched.
    let kept: Conformation = read_artifact(&dir.path().join("run_decoy_1.json")).unwrap();
    assert_eq!(kept, marker);
}

#[test]
fn rerun_launches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut primary = Conformation::extended(5, true);

    let mut first = Scheduler::new(config(dir.path(), 3, 3), perturbation(), &primary);
    first.run(&mut primary).unwrap();
    assert_eq!(first.metrics().launched, 3);

    let mut second = Scheduler::new(config(dir.path(), 3, 3), perturbation(), &primary);
    let result = second.run(&mut primary).unwrap();
    assert_eq!(second.metrics().launched, 0);
    assert_eq!(second.metrics().resumed, 3);
    assert_eq!(result.len(), 3);
    assert_eq!(read_scores(&dir.path().join("run.fasc")).unwrap().len(), 3);
}

#[test]
fn single_decoy_updates_primary() {
    let dir = tempfile::tempdir().unwrap();
    let mut primary = Conformation::extended(4, true);
    let original = primary.clone();

    let report = run_protocol(&config(dir.path(), 1, 1), perturbation(), &mut primary).unwrap();

    let produced: Conformation = read_artifact(&dir.path().join("run_decoy_1.json")).unwrap();
    assert_eq!(primary, produced);
    assert_ne!(primary, original);
    assert_eq!(report.mode, RunMode::Batch);
    assert!(report.end_score.is_some());
}

#[test]
fn corrupt_single_decoy_leaves_primary_alone() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("run_decoy_1.json"), "not a conformation").unwrap();
    let mut primary = Conformation::extended(4, true);
    let original = primary.clone();

    let report = run_protocol(&config(dir.path(), 1, 1), perturbation(), &mut primary).unwrap();

    assert_eq!(primary, original);
    assert!(report.aggregate.unwrap().is_empty());
    assert!(report.end_score.is_none());
    assert_eq!(read_scores(&dir.path().join("run.fasc")).unwrap().len(), 0);
}

#[test]
fn same_base_seed_reproduces_decoys() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let mut primary = Conformation::extended(6, true);

    run_protocol(&config(a.path(), 2, 2), perturbation(), &mut primary.clone()).unwrap();
    run_protocol(&config(b.path(), 2, 2), perturbation(), &mut primary).unwrap();

    for id in 1..=2 {
        let name = format!("run_decoy_{id}.json");
        let x: Conformation = read_artifact(&a.path().join(&name)).unwrap();
        let y: Conformation = read_artifact(&b.path().join(&name)).unwrap();
        assert_eq!(x, y);
    }
    let one: Conformation = read_artifact(&a.path().join("run_decoy_1.json")).unwrap();
    let two: Conformation = read_artifact(&a.path().join("run_decoy_2.json")).unwrap();
    assert_ne!(one, two, "decoys must not share a random stream");
}

#[test]
fn zero_decoys_writes_empty_score_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut primary = Conformation::extended(2, true);

    let report = run_protocol(&config(dir.path(), 0, 4), perturbation(), &mut primary).unwrap();

    assert!(report.aggregate.unwrap().is_empty());
    assert_eq!(std::fs::read_to_string(dir.path().join("run.fasc")).unwrap(), "");
}

#[test]
fn explicit_score_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("custom.scores");
    let mut primary = Conformation::extended(2, true);

    let cfg = config(dir.path(), 2, 2).with_score_file(&target);
    run_protocol(&cfg, perturbation(), &mut primary).unwrap();

    assert_eq!(read_scores(&target).unwrap().len(), 2);
    assert!(!dir.path().join("run.fasc").exists());
}

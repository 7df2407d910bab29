use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use decoy_core::{TaskId, TaskStatus};
use serde::Serialize;
use uuid::Uuid;

/// Counters for one batch run, returned with the aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct BatchMetrics {
    /// Identifies the run in logs.
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub task_count: usize,
    /// Units actually spawned.
    pub launched: usize,
    /// Tasks skipped because their artifact already existed.
    pub resumed: usize,
    pub completed: usize,
    pub completed_with_warning: usize,
    pub failed: usize,
    /// Spawn attempts that errored. The task stayed pending.
    pub launch_failures: usize,
    /// Control loop passes.
    pub passes: u64,
    /// Highest number of simultaneously running units seen.
    pub peak_running: usize,
    /// Unit wall time per finished task.
    pub durations: BTreeMap<TaskId, Duration>,
    /// Average unit wall time.
    pub avg_duration: Duration,
}

impl BatchMetrics {
    pub fn new(task_count: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            task_count,
            launched: 0,
            resumed: 0,
            completed: 0,
            completed_with_warning: 0,
            failed: 0,
            launch_failures: 0,
            passes: 0,
            peak_running: 0,
            durations: BTreeMap::new(),
            avg_duration: Duration::ZERO,
        }
    }

    pub fn record_running(&mut self, running: usize) {
        self.peak_running = self.peak_running.max(running);
    }

    /// Record a terminal status observed for a launched task.
    pub fn record_finish(&mut self, task: TaskId, status: TaskStatus, duration: Option<Duration>) {
        match status {
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::CompletedWithWarning => self.completed_with_warning += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Pending | TaskStatus::Running => return,
        }

        let Some(duration) = duration else { return };
        self.durations.insert(task, duration);

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        let count = self.durations.len();
        self.avg_duration = if count == 1 {
            duration
        } else {
            let prev_nanos = self.avg_duration.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };
    }

    /// Decoys with an artifact, resumed ones included.
    pub fn with_artifact(&self) -> usize {
        self.resumed + self.completed + self.completed_with_warning
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.finished_at?
            .signed_duration_since(self.started_at)
            .to_std()
            .ok()
    }
}

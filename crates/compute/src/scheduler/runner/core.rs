use std::collections::HashMap;

use decoy_core::{
    OutputLayout, Protocol, SchedulerConfig, Task, TaskId, TaskStatus, WorkState, count_status,
};
use tracing::info;

use crate::scheduler::launcher::{Launcher, UnitHandle, launcher_for};
use crate::scheduler::metrics::BatchMetrics;

/// The decoy scheduler. Owns the task set and the handle of every running
/// unit, and keeps at most `concurrency_limit` units alive at once.
pub struct Scheduler<S: WorkState> {
    pub(super) config: SchedulerConfig,
    pub(super) protocol: Protocol<S>,
    /// File naming, resolved once from the primary state's representation.
    pub(super) layout: OutputLayout,
    /// Fixed at construction, in id order.
    pub(super) tasks: Vec<Task>,
    /// Completion handles of running tasks.
    pub(super) handles: HashMap<TaskId, Box<dyn UnitHandle>>,
    pub(super) launcher: Box<dyn Launcher<S>>,
    pub(super) metrics: BatchMetrics,
}

impl<S: WorkState> Scheduler<S> {
    /// Build the task set for `primary` and mark decoys whose artifact is
    /// already on disk as resumed.
    pub fn new(config: SchedulerConfig, protocol: Protocol<S>, primary: &S) -> Self {
        let layout = config.output_layout(primary.representation());
        let mut tasks = layout.build_tasks(config.task_count);
        let mut metrics = BatchMetrics::new(tasks.len());

        for task in tasks.iter_mut().filter(|t| t.artifact_exists()) {
            if task.mark_resumed().is_ok() {
                metrics.resumed += 1;
            }
        }
        if metrics.resumed > 0 {
            info!(
                resumed = metrics.resumed,
                total = tasks.len(),
                "found existing decoys, they will not be rerun"
            );
        }

        let launcher = launcher_for(&config.isolation, &protocol);
        Self {
            config,
            protocol,
            layout,
            tasks,
            handles: HashMap::new(),
            launcher,
            metrics,
        }
    }

    /// Replace the launcher picked from the isolation setting.
    pub fn with_launcher(mut self, launcher: Box<dyn Launcher<S>>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn metrics(&self) -> &BatchMetrics {
        &self.metrics
    }

    pub fn running_count(&self) -> usize {
        count_status(&self.tasks, TaskStatus::Running)
    }

    pub fn pending_count(&self) -> usize {
        count_status(&self.tasks, TaskStatus::Pending)
    }

    /// True once every task has reached a terminal status.
    pub fn is_quiescent(&self) -> bool {
        self.tasks.iter().all(|t| t.status().is_terminal())
    }
}

use decoy_core::{TaskStatus, WorkState};
use tracing::{info, warn};

use crate::scheduler::detector;
use crate::scheduler::unit::{EXIT_SIGNALED, UnitSpec, unit_seed};

use super::Scheduler;

impl<S: WorkState> Scheduler<S> {
    /// Poll every running decoy and retire the ones that ended.
    pub(crate) fn poll_running(&mut self) {
        for task in self
            .tasks
            .iter_mut()
            .filter(|t| t.status() == TaskStatus::Running)
        {
            let (status, exit_code) = match self.handles.get_mut(&task.id) {
                Some(handle) => match detector::poll(task, handle.as_mut()).terminal() {
                    Some(done) => done,
                    None => continue,
                },
                None => {
                    warn!(task = task.id, "running decoy has no handle, marking it failed");
                    (TaskStatus::Failed, EXIT_SIGNALED)
                }
            };
            self.handles.remove(&task.id);

            if let Err(e) = task.finish(status, exit_code) {
                warn!(task = task.id, error = %e, "ignoring invalid status change");
                continue;
            }
            self.metrics.record_finish(task.id, status, task.duration());
            info!(
                task = task.id,
                status = ?status,
                exit_code,
                duration_ms = task.duration().map(|d| d.as_millis() as u64),
                "decoy finished"
            );
        }
    }

    /// Launch pending decoys in id order until the limit is reached.
    ///
    /// A decoy whose artifact appeared since construction is marked resumed
    /// instead. A failed launch leaves the decoy pending for the next pass.
    pub(crate) fn admit_pending(&mut self, primary: &S) {
        let limit = self.config.concurrency_limit.get();
        let mut running = self.running_count();

        for task in self.tasks.iter_mut() {
            if running >= limit {
                break;
            }
            if task.status() != TaskStatus::Pending {
                continue;
            }

            if task.artifact_exists() {
                if task.mark_resumed().is_ok() {
                    self.metrics.resumed += 1;
                    info!(task = task.id, "artifact appeared, skipping decoy");
                }
                continue;
            }

            let spec = UnitSpec {
                task_id: task.id,
                rounds: self.config.rounds_per_task,
                seed: unit_seed(self.config.base_seed, task.id),
                output_path: task.output_path.clone(),
                snapshot_path: self.layout.snapshot_path(task.id),
            };
            let seed = spec.seed;

            match self.launcher.launch(spec, primary.clone()) {
                Ok(handle) => {
                    if let Err(e) = task.mark_running() {
                        warn!(task = task.id, error = %e, "ignoring invalid status change");
                        continue;
                    }
                    self.handles.insert(task.id, handle);
                    self.metrics.launched += 1;
                    running += 1;
                    info!(task = task.id, seed, running, limit, "decoy launched");
                }
                Err(e) => {
                    self.metrics.launch_failures += 1;
                    warn!(task = task.id, error = %e, "launch failed, will retry next pass");
                }
            }
        }
    }
}

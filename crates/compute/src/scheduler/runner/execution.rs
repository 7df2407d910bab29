use std::fs;
use std::thread;

use decoy_core::WorkState;
use tracing::{debug, info};

use crate::error::BatchError;
use crate::scheduler::aggregator::{AggregateResult, finalize, fold_single_result};

use super::Scheduler;

impl<S: WorkState> Scheduler<S> {
    /// Run every decoy to a terminal status, then score the results.
    ///
    /// Blocks until quiescence. Each pass retires finished units, admits
    /// pending decoys up to the limit, then sleeps `poll_interval`. Decoy
    /// failures never end the run early. With exactly one decoy, its result
    /// replaces `primary`.
    pub fn run(&mut self, primary: &mut S) -> Result<AggregateResult, BatchError> {
        let directory = self.layout.directory().to_path_buf();
        fs::create_dir_all(&directory).map_err(|source| BatchError::OutputDirectory {
            path: directory.clone(),
            source,
        })?;

        info!(
            run_id = %self.metrics.run_id,
            tasks = self.tasks.len(),
            limit = self.config.concurrency_limit.get(),
            rounds = self.config.rounds_per_task,
            isolation = self.config.isolation.label(),
            output = %directory.display(),
            "decoy batch starting"
        );

        loop {
            self.metrics.passes += 1;
            self.poll_running();
            self.admit_pending(primary);

            let running = self.running_count();
            let pending = self.pending_count();
            self.metrics.record_running(running);
            debug!(pass = self.metrics.passes, running, pending, "scheduler pass");

            if running == 0 && pending == 0 {
                break;
            }
            thread::sleep(self.config.poll_interval);
        }

        let aggregate = finalize(
            &self.tasks,
            self.layout.score_file(),
            self.protocol.score.as_ref(),
        )?;
        if self.config.task_count == 1 {
            fold_single_result(&self.tasks, &aggregate, primary);
        }
        self.metrics.finish();

        info!(
            run_id = %self.metrics.run_id,
            launched = self.metrics.launched,
            resumed = self.metrics.resumed,
            completed = self.metrics.completed,
            completed_with_warning = self.metrics.completed_with_warning,
            failed = self.metrics.failed,
            peak_running = self.metrics.peak_running,
            "decoy batch finished"
        );
        Ok(aggregate)
    }
}

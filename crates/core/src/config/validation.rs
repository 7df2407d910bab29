use std::num::NonZeroUsize;
use std::time::Duration;

use tracing::debug;

use crate::error::ConfigError;

use super::types::{DecoyConfig, Isolation, SchedulerConfig};

impl DecoyConfig {
    /// Validate the config: counts, naming and worker settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_counts()?;
        self.validate_output()?;
        self.validate_worker()?;
        Ok(())
    }

    /// Validate and convert into the settings the scheduler runs with.
    pub fn resolve(&self) -> Result<SchedulerConfig, ConfigError> {
        self.validate()?;

        let limit = usize::try_from(self.batch.concurrency_limit).unwrap_or(0);
        let concurrency_limit = NonZeroUsize::new(limit).unwrap_or_else(|| {
            debug!("concurrency_limit 0 coerced to 1");
            NonZeroUsize::MIN
        });

        let isolation = match self.worker.isolation.as_str() {
            "process" => Isolation::Process {
                program: self.worker.program.clone().unwrap_or_default(),
            },
            _ => Isolation::Thread,
        };

        Ok(SchedulerConfig {
            task_count: usize::try_from(self.batch.decoy_count).unwrap_or(0),
            concurrency_limit,
            rounds_per_task: u32::try_from(self.batch.rounds_per_task).unwrap_or(1),
            batch_mode: self.batch.batch_mode,
            isolation,
            poll_interval: Duration::from_millis(self.worker.poll_interval_ms),
            base_seed: self.worker.base_seed,
            output_directory: self.output.directory.clone(),
            output_basename: self.output.basename.clone(),
            artifact_extension: self.output.extension.clone(),
            score_file: self.output.score_file.clone(),
        })
    }

    fn validate_counts(&self) -> Result<(), ConfigError> {
        if self.batch.decoy_count < 0 {
            return Err(ConfigError::Invalid(format!(
                "decoy_count must be >= 0, got {}",
                self.batch.decoy_count
            )));
        }
        if self.batch.concurrency_limit < 0 {
            return Err(ConfigError::Invalid(format!(
                "concurrency_limit must be >= 0, got {}",
                self.batch.concurrency_limit
            )));
        }
        if self.batch.rounds_per_task < 1 || self.batch.rounds_per_task > i64::from(u32::MAX) {
            return Err(ConfigError::Invalid(format!(
                "rounds_per_task must be between 1 and {}, got {}",
                u32::MAX,
                self.batch.rounds_per_task
            )));
        }
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        let basename = &self.output.basename;
        if basename.is_empty() || basename.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "output basename '{basename}' must be a non-empty file name"
            )));
        }
        if self.output.extension.is_empty() || self.output.extension.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "artifact extension '{}' must be non-empty and given without a dot",
                self.output.extension
            )));
        }
        if let Some(score_file) = &self.output.score_file {
            if score_file.file_name().is_none() {
                return Err(ConfigError::Invalid(format!(
                    "score_file '{}' does not name a file",
                    score_file.display()
                )));
            }
        }
        Ok(())
    }

    fn validate_worker(&self) -> Result<(), ConfigError> {
        match self.worker.isolation.as_str() {
            "thread" => {}
            "process" => {
                if self.batch.batch_mode && self.worker.program.is_none() {
                    return Err(ConfigError::Invalid(
                        "process isolation requires worker.program".into(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "invalid isolation '{other}', expected 'thread' or 'process'"
                )));
            }
        }
        if self.worker.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

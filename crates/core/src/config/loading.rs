use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ConfigError;

use super::types::DecoyConfig;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

impl DecoyConfig {
    /// Parse config from a TOML string, apply env overrides, then validate.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config = Self::layered_from_toml(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Load from `path` when it exists, otherwise start from defaults, then
    /// apply env overrides.
    ///
    /// Not validated: callers layer further overrides on top and
    /// [`DecoyConfig::resolve`] validates the final result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            debug!(path = %path.display(), "loading decoy config");
            let content = std::fs::read_to_string(path)?;
            Self::layered_from_toml(&content)
        } else {
            debug!(path = %path.display(), "config file not found, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    fn layered_from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        Ok(config)
    }

    // ── Environment variable overrides ──────────────────────────────

    /// Apply environment variable overrides.
    ///
    /// Convention: `DECOY_<KEY>` overrides the matching field:
    /// - `DECOY_DECOY_COUNT` -> `batch.decoy_count`
    /// - `DECOY_CONCURRENCY_LIMIT` -> `batch.concurrency_limit`
    /// - `DECOY_ROUNDS_PER_TASK` -> `batch.rounds_per_task`
    /// - `DECOY_BATCH_MODE` -> `batch.batch_mode`
    /// - `DECOY_OUTPUT_DIRECTORY` -> `output.directory`
    /// - `DECOY_OUTPUT_BASENAME` -> `output.basename`
    /// - `DECOY_SCORE_FILE` -> `output.score_file`
    /// - `DECOY_ISOLATION` -> `worker.isolation`
    /// - `DECOY_WORKER_PROGRAM` -> `worker.program`
    /// - `DECOY_POLL_INTERVAL_MS` -> `worker.poll_interval_ms`
    /// - `DECOY_BASE_SEED` -> `worker.base_seed`
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parsed("DECOY_DECOY_COUNT") {
            self.batch.decoy_count = v;
        }
        if let Some(v) = env_parsed("DECOY_CONCURRENCY_LIMIT") {
            self.batch.concurrency_limit = v;
        }
        if let Some(v) = env_parsed("DECOY_ROUNDS_PER_TASK") {
            self.batch.rounds_per_task = v;
        }
        if let Some(v) = env_parsed("DECOY_BATCH_MODE") {
            self.batch.batch_mode = v;
        }
        if let Some(v) = env_opt("DECOY_OUTPUT_DIRECTORY") {
            self.output.directory = PathBuf::from(v);
        }
        if let Some(v) = env_opt("DECOY_OUTPUT_BASENAME") {
            self.output.basename = v;
        }
        if let Some(v) = env_opt("DECOY_SCORE_FILE") {
            self.output.score_file = Some(PathBuf::from(v));
        }
        if let Some(v) = env_opt("DECOY_ISOLATION") {
            self.worker.isolation = v;
        }
        if let Some(v) = env_opt("DECOY_WORKER_PROGRAM") {
            self.worker.program = Some(PathBuf::from(v));
        }
        if let Some(v) = env_parsed("DECOY_POLL_INTERVAL_MS") {
            self.worker.poll_interval_ms = v;
        }
        if let Some(v) = env_parsed("DECOY_BASE_SEED") {
            self.worker.base_seed = Some(v);
        }
    }
}

pub(super) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

pub(super) fn env_parsed<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_opt(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable env override");
            None
        }
    }
}

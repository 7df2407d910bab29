use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::layout::OutputLayout;
use crate::state::Representation;

// ── Top-level config ────────────────────────────────────────────────

/// Full configuration for a decoy batch, as written in `decoy.toml`.
///
/// Counts are signed on purpose: a negative value is a configuration error
/// reported by [`DecoyConfig::validate`], not a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoyConfig {
    /// How many decoys, how many at once, how many rounds each.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Artifact and score file naming.
    #[serde(default)]
    pub output: OutputConfig,

    /// Execution unit settings.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Named transform and score function from the protocol registry.
    #[serde(default)]
    pub protocol: ProtocolConfig,
}

// ── Section configs ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of decoys to produce.
    #[serde(default = "default_decoy_count")]
    pub decoy_count: i64,

    /// Maximum decoys running at once. 0 is treated as 1.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: i64,

    /// Transform applications per decoy.
    #[serde(default = "default_rounds_per_task")]
    pub rounds_per_task: i64,

    /// `false` applies the transform directly to the input state in-process.
    #[serde(default = "default_batch_mode")]
    pub batch_mode: bool,
}

fn default_decoy_count() -> i64 {
    1
}

fn default_concurrency_limit() -> i64 {
    1
}

fn default_rounds_per_task() -> i64 {
    1
}

fn default_batch_mode() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            decoy_count: default_decoy_count(),
            concurrency_limit: default_concurrency_limit(),
            rounds_per_task: default_rounds_per_task(),
            batch_mode: default_batch_mode(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_output_basename")]
    pub basename: String,

    /// Artifact file extension, without the dot.
    #[serde(default = "default_artifact_extension")]
    pub extension: String,

    /// Explicit score file. When unset it is derived from the basename and
    /// the input state's representation (`.fasc` or `.sc`).
    #[serde(default)]
    pub score_file: Option<PathBuf>,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_basename() -> String {
    "decoy".into()
}

fn default_artifact_extension() -> String {
    "json".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            basename: default_output_basename(),
            extension: default_artifact_extension(),
            score_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// "thread" or "process".
    #[serde(default = "default_isolation")]
    pub isolation: String,

    /// Worker binary used with process isolation.
    #[serde(default)]
    pub program: Option<PathBuf>,

    /// Pause between scheduler passes, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Fixed base seed; decoy `i` uses `base_seed + i`. Unset draws fresh
    /// entropy per decoy.
    #[serde(default)]
    pub base_seed: Option<u64>,
}

fn default_isolation() -> String {
    "thread".into()
}

fn default_poll_interval_ms() -> u64 {
    5000
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            isolation: default_isolation(),
            program: None,
            poll_interval_ms: default_poll_interval_ms(),
            base_seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default = "default_transform")]
    pub transform: String,

    #[serde(default = "default_score")]
    pub score: String,
}

fn default_transform() -> String {
    "small_perturbation".into()
}

fn default_score() -> String {
    "torsion_energy".into()
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            transform: default_transform(),
            score: default_score(),
        }
    }
}

// ── Resolved config ─────────────────────────────────────────────────

/// How execution units are isolated from each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Isolation {
    /// One OS thread per decoy, state cloned in memory.
    Thread,
    /// One OS process per decoy running `program`, state passed as a snapshot file.
    Process { program: PathBuf },
}

impl Isolation {
    pub fn label(&self) -> &'static str {
        match self {
            Isolation::Thread => "thread",
            Isolation::Process { .. } => "process",
        }
    }
}

/// Validated scheduler settings. Produced by [`DecoyConfig::resolve`] or
/// built directly with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub task_count: usize,
    pub concurrency_limit: NonZeroUsize,
    pub rounds_per_task: u32,
    pub batch_mode: bool,
    pub isolation: Isolation,
    pub poll_interval: Duration,
    pub base_seed: Option<u64>,
    pub output_directory: PathBuf,
    pub output_basename: String,
    pub artifact_extension: String,
    pub score_file: Option<PathBuf>,
}

impl SchedulerConfig {
    pub fn new(output_directory: impl Into<PathBuf>, output_basename: impl Into<String>) -> Self {
        Self {
            task_count: default_decoy_count() as usize,
            concurrency_limit: NonZeroUsize::MIN,
            rounds_per_task: 1,
            batch_mode: true,
            isolation: Isolation::Thread,
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
            base_seed: None,
            output_directory: output_directory.into(),
            output_basename: output_basename.into(),
            artifact_extension: default_artifact_extension(),
            score_file: None,
        }
    }

    pub fn with_task_count(mut self, task_count: usize) -> Self {
        self.task_count = task_count;
        self
    }

    /// Set the concurrency ceiling; 0 is coerced to 1.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = NonZeroUsize::new(limit).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Set rounds per decoy; 0 is coerced to 1.
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds_per_task = rounds.max(1);
        self
    }

    pub fn with_batch_mode(mut self, batch_mode: bool) -> Self {
        self.batch_mode = batch_mode;
        self
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = Some(seed);
        self
    }

    pub fn with_artifact_extension(mut self, extension: impl Into<String>) -> Self {
        self.artifact_extension = extension.into();
        self
    }

    pub fn with_score_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.score_file = Some(path.into());
        self
    }

    /// Resolve file naming for a batch whose input has `representation`.
    pub fn output_layout(&self, representation: Representation) -> OutputLayout {
        let score_file = self.score_file.clone().unwrap_or_else(|| {
            self.output_directory.join(format!(
                "{}.{}",
                self.output_basename,
                representation.score_suffix()
            ))
        });
        OutputLayout::new(
            &self.output_directory,
            &self.output_basename,
            &self.artifact_extension,
            score_file,
        )
    }
}

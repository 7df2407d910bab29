use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::task::TaskId;

/// Level of detail of a working state. Decides the score file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    FullAtom,
    Centroid,
}

impl Representation {
    pub fn score_suffix(self) -> &'static str {
        match self {
            Representation::FullAtom => "fasc",
            Representation::Centroid => "sc",
        }
    }
}

/// Caller state that decoys copy, transform and write out as artifacts.
///
/// Every execution unit receives its own clone, so implementations never need
/// interior locking. Serde is the artifact and snapshot format.
pub trait WorkState: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    fn representation(&self) -> Representation;
}

/// Per-unit execution context handed to every transform round.
///
/// The RNG is seeded once when the unit starts, so rounds within a decoy
/// draw different numbers while separate decoys never share a stream.
pub struct WorkerContext {
    task_id: TaskId,
    seed: u64,
    round: u32,
    rng: StdRng,
}

impl WorkerContext {
    pub fn new(task_id: TaskId, seed: u64) -> Self {
        Self {
            task_id,
            seed,
            round: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current round, 1-based. Zero before the first round starts.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn set_round(&mut self, round: u32) {
        self.round = round;
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

/// Opaque per-round operation applied to a decoy's private state.
///
/// Must be deterministic given identical state and context seed.
pub trait Transform<S>: Send + Sync {
    /// Registry name, also passed to out-of-process workers.
    fn name(&self) -> &str;

    fn apply(&self, state: &mut S, ctx: &mut WorkerContext) -> Result<(), TransformError>;
}

/// Pure, repeatable scoring of a state. Lower is better by convention.
pub trait ScoreFunction<S>: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, state: &S) -> f64;
}

/// A transform paired with the score function used to judge its output.
pub struct Protocol<S> {
    pub transform: Arc<dyn Transform<S>>,
    pub score: Arc<dyn ScoreFunction<S>>,
}

impl<S> Protocol<S> {
    pub fn new(transform: Arc<dyn Transform<S>>, score: Arc<dyn ScoreFunction<S>>) -> Self {
        Self { transform, score }
    }
}

impl<S> Clone for Protocol<S> {
    fn clone(&self) -> Self {
        Self {
            transform: Arc::clone(&self.transform),
            score: Arc::clone(&self.score),
        }
    }
}

impl<S> std::fmt::Debug for Protocol<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Protocol")
            .field("transform", &self.transform.name())
            .field("score", &self.score.name())
            .finish()
    }
}

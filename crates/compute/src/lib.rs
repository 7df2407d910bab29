pub mod error;
pub mod protocol;
pub mod protocols;
pub mod registry;
pub mod scheduler;
pub mod worker;

pub use error::{ArtifactError, BatchError, LaunchError, UnitError};
pub use protocol::{ProtocolReport, RunMode, run_protocol};
pub use registry::{ProtocolRegistry, RegistryError};
pub use scheduler::{AggregateResult, BatchMetrics, Scheduler, ScoredDecoy};
pub use worker::{WorkerArgs, run_worker};

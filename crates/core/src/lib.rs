pub mod config;
pub mod error;
pub mod layout;
pub mod state;
pub mod task;

pub use config::{DecoyConfig, Isolation, SchedulerConfig};
pub use error::*;
pub use layout::OutputLayout;
pub use state::{Protocol, Representation, ScoreFunction, Transform, WorkState, WorkerContext};
pub use task::{Task, TaskId, TaskStatus, count_status};

//! Batch configuration: TOML file, `DECOY_*` env overrides, validation.
//!
//! [`DecoyConfig`] mirrors the file layout. [`DecoyConfig::resolve`] turns it
//! into a [`SchedulerConfig`], the only form the scheduler accepts.

mod loading;
mod types;
mod validation;

pub use loading::load_dotenv;
pub use types::{
    BatchConfig, DecoyConfig, Isolation, OutputConfig, ProtocolConfig, SchedulerConfig,
    WorkerConfig,
};

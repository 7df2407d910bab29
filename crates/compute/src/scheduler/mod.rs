//! Bounded-concurrency decoy scheduler.
//!
//! The [`Scheduler`] drives a fixed set of decoys through isolated execution
//! units, never keeping more than the configured limit alive. A single
//! control thread polls unit handles at a fixed interval, classifies
//! finished decoys by exit code and artifact presence, and admits pending
//! decoys in id order. Once every decoy is terminal the aggregator scores
//! the artifacts and rewrites the score file.

pub mod aggregator;
pub mod artifact;
pub mod detector;
pub mod launcher;
pub mod metrics;
pub mod runner;
pub mod score_file;
pub mod sequential;
pub mod unit;

pub use aggregator::{AggregateResult, ScoredDecoy, finalize, fold_single_result};
pub use artifact::{read_artifact, write_artifact};
pub use detector::Completion;
pub use launcher::{Launcher, ProcessLauncher, ThreadLauncher, UnitHandle, UnitState, launcher_for};
pub use metrics::BatchMetrics;
pub use runner::Scheduler;
pub use sequential::run_sequential;
pub use unit::{UnitReport, UnitSpec, run_unit, unit_seed};

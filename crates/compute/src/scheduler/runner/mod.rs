//! Decoy batch runner: bounded-concurrency admission over a fixed task set.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructor, resume pre-pass and accessors
//! - `execution`: the polling control loop and finalization
//! - `scheduling`: retiring finished units and FIFO admission

mod core;
mod execution;
mod scheduling;

pub use self::core::Scheduler;

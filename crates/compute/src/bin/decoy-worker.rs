//! decoy-worker: runs one process-isolated decoy.
//!
//! Spawned by `decoy-batch` when isolation is `process`. Loads the snapshot,
//! applies the named transform, writes the artifact atomically and exits 0.
//! Any failure exits non-zero so the scheduler can classify the decoy.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use decoy_compute::protocols::demo_registry;
use decoy_compute::{WorkerArgs, run_worker};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = WorkerArgs::parse();
    let registry = demo_registry().context("building protocol registry")?;

    let report = run_worker(&args, &registry)
        .with_context(|| format!("decoy {} failed", args.task_id))?;
    info!(
        task = args.task_id,
        start_score = report.start_score,
        end_score = report.end_score,
        "worker done"
    );
    Ok(())
}

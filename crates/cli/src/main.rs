mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use decoy_compute::protocols::{Conformation, demo_registry};
use decoy_compute::run_protocol;
use decoy_core::config::load_dotenv;

use crate::cli::CliArgs;
use crate::config::load_layered;

fn main() -> Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let (config, scheduler_config) = load_layered(&args, std::env::current_exe().ok())?;

    let registry = demo_registry().context("failed to build protocol registry")?;
    let protocol = registry
        .protocol(&config.protocol.transform, &config.protocol.score)
        .context("failed to resolve protocol")?;

    let mut primary = Conformation::extended(args.residues, !args.centroid);
    info!(
        residues = primary.len(),
        transform = %config.protocol.transform,
        score = %config.protocol.score,
        decoys = scheduler_config.task_count,
        batch_mode = scheduler_config.batch_mode,
        "starting protocol"
    );

    let report = run_protocol(&scheduler_config, protocol, &mut primary)
        .context("protocol run failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

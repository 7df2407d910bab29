use std::path::PathBuf;

use anyhow::{Context, Result};
use decoy_core::{DecoyConfig, SchedulerConfig};

use crate::cli::CliArgs;

/// Layer file, env and flags, then validate once.
///
/// Validation only runs on the final result, so a flag can fix a bad file
/// value and process isolation can pick up its default worker program.
pub fn load_layered(
    args: &CliArgs,
    current_exe: Option<PathBuf>,
) -> Result<(DecoyConfig, SchedulerConfig)> {
    let mut config = DecoyConfig::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;
    apply_cli_overrides(&mut config, args);
    default_worker_program(&mut config, current_exe);
    let scheduler_config = config.resolve().context("invalid configuration")?;
    Ok((config, scheduler_config))
}

/// Apply command-line overrides on top of file and env settings.
pub fn apply_cli_overrides(config: &mut DecoyConfig, args: &CliArgs) {
    if let Some(n) = args.decoys {
        config.batch.decoy_count = i64::from(n);
    }
    if let Some(n) = args.jobs {
        config.batch.concurrency_limit = i64::from(n);
    }
    if let Some(n) = args.rounds {
        config.batch.rounds_per_task = i64::from(n);
    }
    if args.sequential {
        config.batch.batch_mode = false;
    }
    if let Some(ref dir) = args.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(ref name) = args.basename {
        config.output.basename = name.clone();
    }
    if let Some(ref isolation) = args.isolation {
        config.worker.isolation = isolation.clone();
    }
    if let Some(ref program) = args.worker_program {
        config.worker.program = Some(program.clone());
    }
    if let Some(seed) = args.seed {
        config.worker.base_seed = Some(seed);
    }
    if let Some(ref t) = args.transform {
        config.protocol.transform = t.clone();
    }
    if let Some(ref s) = args.score {
        config.protocol.score = s.clone();
    }
}

/// Fill in the worker program for process isolation when none was given:
/// `decoy-worker` in the same directory as `current_exe`.
pub fn default_worker_program(config: &mut DecoyConfig, current_exe: Option<PathBuf>) {
    if config.worker.isolation != "process" || config.worker.program.is_some() {
        return;
    }
    let name = format!("decoy-worker{}", std::env::consts::EXE_SUFFIX);
    config.worker.program = current_exe
        .as_deref()
        .and_then(|exe| exe.parent())
        .map(|dir| dir.join(name));
}

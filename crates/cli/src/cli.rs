use std::path::PathBuf;

use clap::Parser;

/// Produce a batch of decoys from a torsion-space conformation.
///
/// Settings come from the TOML config, then `DECOY_*` environment
/// variables, then these flags.
#[derive(Parser, Debug)]
#[command(name = "decoy-batch", version, about = "Bounded-concurrency decoy batch runner")]
pub struct CliArgs {
    /// Path to the TOML config file (missing file means defaults)
    #[arg(long, env = "DECOY_CONFIG", default_value = "decoy.toml")]
    pub config: PathBuf,

    /// Number of decoys to produce
    #[arg(long)]
    pub decoys: Option<u32>,

    /// Maximum decoys running at once (0 runs one at a time)
    #[arg(long, short = 'j')]
    pub jobs: Option<u32>,

    /// Transform rounds per decoy
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Directory for artifacts and the score file
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Artifact basename, decoys are named `{basename}_decoy_{i}`
    #[arg(long)]
    pub basename: Option<String>,

    /// Unit isolation: thread or process
    #[arg(long)]
    pub isolation: Option<String>,

    /// Worker binary for process isolation (default: decoy-worker next to this binary)
    #[arg(long)]
    pub worker_program: Option<PathBuf>,

    /// Apply the transform to the input directly instead of producing decoys
    #[arg(long)]
    pub sequential: bool,

    /// Base seed; decoy `i` uses `seed + i`
    #[arg(long)]
    pub seed: Option<u64>,

    /// Transform name override
    #[arg(long)]
    pub transform: Option<String>,

    /// Score function name override
    #[arg(long)]
    pub score: Option<String>,

    /// Residues in the generated input conformation
    #[arg(long, default_value = "20")]
    pub residues: usize,

    /// Use the centroid representation for the input (score file `.sc`)
    #[arg(long)]
    pub centroid: bool,
}

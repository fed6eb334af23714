use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use streamcheck_engine::RunConfig;

/// Probe M3U playlist streams and keep the working ones.
#[derive(Debug, Parser)]
#[command(name = "streamcheck", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug-level logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to ./streamcheck.log.
    #[arg(long, global = true)]
    pub log_file: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Test every channel in a folder of playlists and write the working
    /// subset.
    Run(RunArgs),
    /// Check a single stream URL for liveness.
    Probe(ProbeArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Folder containing .m3u/.m3u8 playlist files (scanned
    /// non-recursively).
    #[arg(long)]
    pub folder: PathBuf,

    /// Destination for the aggregated working-only playlist.
    #[arg(long)]
    pub output: PathBuf,

    /// Per-stream probe timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_seconds: u64,

    /// Upper bound on concurrently probed streams.
    #[arg(long, default_value_t = 20)]
    pub max_concurrent: usize,

    /// Drop duplicate entries (same name and URL) across playlist files.
    #[arg(long)]
    pub dedup: bool,

    /// Additionally write one playlist per category into this folder.
    #[arg(long)]
    pub split_dir: Option<PathBuf>,

    /// Print the full run report as JSON instead of the summary table.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn to_config(&self) -> RunConfig {
        RunConfig {
            folder_path: self.folder.clone(),
            output_path: self.output.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            max_concurrent: self.max_concurrent,
            dedup: self.dedup,
            split_dir: self.split_dir.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Stream URL to check.
    pub url: String,

    /// Probe timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_seconds: u64,
}

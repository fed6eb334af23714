use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use streamcheck_core::{CategorySummary, ProbeResult, RunStats};

/// Caller-supplied parameters for one run. Immutable for the run's
/// duration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Folder scanned (non-recursively) for `.m3u`/`.m3u8` files.
    pub folder_path: PathBuf,
    /// Destination for the aggregated working-only playlist.
    pub output_path: PathBuf,
    /// Per-probe time budget.
    pub timeout: Duration,
    /// Upper bound on concurrently in-flight probes.
    pub max_concurrent: usize,
    /// Drop cross-file duplicates sharing the same `(name, url)` tuple,
    /// keeping the first occurrence. Off by default: entries from
    /// different files are distinct unless dedup is requested.
    pub dedup: bool,
    /// When set, additionally write one playlist per category here.
    pub split_dir: Option<PathBuf>,
}

/// Stages of the run state machine, in pipeline order. `Cancelled` and
/// `Failed` are terminal; `Cancelled` is reachable up to and including
/// `Probing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStage {
    Idle,
    Discovering,
    Parsing,
    Probing,
    Aggregating,
    Writing,
    Done,
    Cancelled,
    Failed,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStage::Idle => "idle",
            RunStage::Discovering => "discovering playlists",
            RunStage::Parsing => "parsing",
            RunStage::Probing => "probing",
            RunStage::Aggregating => "aggregating",
            RunStage::Writing => "writing output",
            RunStage::Done => "done",
            RunStage::Cancelled => "cancelled",
            RunStage::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Live progress snapshot, emitted once per completed probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub tested: usize,
    pub total: usize,
    pub working: usize,
    /// Name of the most recently completed channel.
    pub current: Option<String>,
}

/// Event stream a run emits to the boundary.
#[derive(Debug)]
pub enum RunEvent {
    Stage(RunStage),
    Progress(Progress),
    Categories(Vec<CategorySummary>),
    Finished(Result<RunReport, RunError>),
}

/// Terminal report for a finished or cancelled run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub results: Vec<ProbeResult>,
    pub categories: Vec<CategorySummary>,
    /// Paths actually written; empty for a cancelled run.
    pub written_paths: Vec<PathBuf>,
    pub stats: RunStats,
}

impl RunReport {
    pub fn cancelled(&self) -> bool {
        self.stats.cancelled
    }
}

/// Conditions that make a run itself meaningless. Individual probe
/// failures never appear here; they are recorded per channel instead.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("playlist folder not found: {0}")]
    FolderNotFound(PathBuf),
    #[error("no .m3u/.m3u8 playlists found in {0}")]
    NoPlaylists(PathBuf),
    #[error("no channels parsed from any playlist")]
    NoChannels,
    #[error("a run is already in progress")]
    AlreadyRunning,
    #[error("http client setup failed: {0}")]
    ClientSetup(String),
    #[error("run controller worker terminated")]
    ControllerGone,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The write step failed after probing completed. Probe results are
    /// carried along so the caller can still inspect them.
    #[error("write failed: {source}")]
    WriteFailed {
        source: crate::output::WriteError,
        results: Vec<ProbeResult>,
        categories: Vec<CategorySummary>,
    },
}

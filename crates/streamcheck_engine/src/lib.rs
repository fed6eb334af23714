//! Streamcheck engine: stream probing, bounded scheduling and run control.
//!
//! The engine owns every side effect of a test run: playlist discovery on
//! disk, HTTP liveness probes, the bounded worker pool that drives them,
//! atomic playlist output and the run state machine. The pure pieces
//! (parsing, aggregation, serialization) live in `streamcheck_core`.
mod discover;
mod output;
mod probe;
mod runner;
mod schedule;
mod types;

pub use discover::discover_playlists;
pub use output::{ensure_output_dir, write_by_category, write_playlist, WriteError};
pub use probe::{HttpProber, ProbeOutcome, Prober, ProbeSettings};
pub use runner::{execute_run, probe_single, RunnerHandle};
pub use schedule::{probe_all, ChannelProgressSink, NullProgressSink, ProgressSink};
pub use types::{Progress, RunConfig, RunError, RunEvent, RunReport, RunStage};

// Cancellation is part of the public contract; re-export the token type so
// boundary crates do not need a direct tokio-util dependency.
pub use tokio_util::sync::CancellationToken;

use std::collections::HashSet;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use streamcheck_core::{aggregate, parse, Channel, RunStats};

use crate::discover::discover_playlists;
use crate::output::{write_by_category, write_playlist};
use crate::probe::{HttpProber, ProbeOutcome, Prober, ProbeSettings};
use crate::schedule::{probe_all, ChannelProgressSink, ProgressSink};
use crate::types::{RunConfig, RunError, RunEvent, RunReport, RunStage};

/// Drive one complete run: discover, parse, probe, aggregate, write.
///
/// Stage transitions and per-probe progress go through `sink`; the final
/// outcome is the return value. Cancellation observed during discovery,
/// parsing or probing short-circuits into a cancelled report carrying
/// whatever results had completed; no output files are written for a
/// cancelled run. A failed write after probing returns
/// [`RunError::WriteFailed`] with the probe results preserved.
pub async fn execute_run(
    config: &RunConfig,
    prober: &dyn Prober,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<RunReport, RunError> {
    sink.emit(RunEvent::Stage(RunStage::Discovering));
    let files = discover_playlists(&config.folder_path)?;
    log::info!(
        "found {} playlist file(s) in {}",
        files.len(),
        config.folder_path.display()
    );

    sink.emit(RunEvent::Stage(RunStage::Parsing));
    let mut channels: Vec<Channel> = Vec::new();
    for file in &files {
        let text = fs::read_to_string(file)?;
        let parsed = parse(&text);
        log::info!("{}: {} channel(s)", file.display(), parsed.len());
        channels.extend(parsed);
    }
    if config.dedup {
        let before = channels.len();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        channels.retain(|c| seen.insert((c.name.clone(), c.url.clone())));
        log::info!("dedup removed {} duplicate entries", before - channels.len());
    }
    if channels.is_empty() {
        return Err(RunError::NoChannels);
    }
    let total = channels.len();

    if cancel.is_cancelled() {
        sink.emit(RunEvent::Stage(RunStage::Cancelled));
        return Ok(cancelled_report(Vec::new(), total));
    }

    sink.emit(RunEvent::Stage(RunStage::Probing));
    let results = probe_all(channels, prober, config.max_concurrent, sink, cancel).await;

    sink.emit(RunEvent::Stage(RunStage::Aggregating));
    let categories = aggregate(&results);
    sink.emit(RunEvent::Categories(categories.clone()));

    let working: Vec<Channel> = results
        .iter()
        .filter(|r| r.working)
        .map(|r| r.channel.clone())
        .collect();
    let stats = RunStats {
        total,
        tested: results.len(),
        working: working.len(),
        cancelled: cancel.is_cancelled(),
    };

    if stats.cancelled {
        sink.emit(RunEvent::Stage(RunStage::Cancelled));
        return Ok(RunReport {
            results,
            categories,
            written_paths: Vec::new(),
            stats,
        });
    }

    sink.emit(RunEvent::Stage(RunStage::Writing));
    let mut written_paths = vec![config.output_path.clone()];
    let write_result = write_playlist(&config.output_path, &working).and_then(|()| {
        if let Some(dir) = &config.split_dir {
            let split = write_by_category(dir, &working)?;
            written_paths.extend(split);
        }
        Ok(())
    });
    if let Err(source) = write_result {
        return Err(RunError::WriteFailed {
            source,
            results,
            categories,
        });
    }
    log::info!(
        "wrote {} working channel(s) to {}",
        working.len(),
        config.output_path.display()
    );

    sink.emit(RunEvent::Stage(RunStage::Done));
    Ok(RunReport {
        results,
        categories,
        written_paths,
        stats,
    })
}

fn cancelled_report(results: Vec<streamcheck_core::ProbeResult>, total: usize) -> RunReport {
    let working = results.iter().filter(|r| r.working).count();
    let stats = RunStats {
        total,
        tested: results.len(),
        working,
        cancelled: true,
    };
    let categories = aggregate(&results);
    RunReport {
        results,
        categories,
        written_paths: Vec::new(),
        stats,
    }
}

/// One-off liveness check for a single URL, without a run.
pub fn probe_single(url: &str, timeout: Duration) -> Result<ProbeOutcome, RunError> {
    let settings = ProbeSettings {
        timeout,
        ..ProbeSettings::default()
    };
    let prober = HttpProber::new(settings).map_err(|e| RunError::ClientSetup(e.to_string()))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(prober.probe(url)))
}

enum RunnerCommand {
    Start {
        config: RunConfig,
        cancel: CancellationToken,
    },
}

/// Boundary handle for the run controller.
///
/// Owns a worker thread with its own tokio runtime; runs are submitted
/// over a command channel and [`RunEvent`]s stream back over an event
/// channel. Exactly one run is active per handle: a second `start` while
/// one is in flight is rejected with [`RunError::AlreadyRunning`] instead
/// of interleaving state.
pub struct RunnerHandle {
    cmd_tx: mpsc::Sender<RunnerCommand>,
    event_rx: mpsc::Receiver<RunEvent>,
    active: Arc<AtomicBool>,
    current_cancel: Option<CancellationToken>,
}

impl RunnerHandle {
    pub fn new(settings: ProbeSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RunnerCommand>();
        let (event_tx, event_rx) = mpsc::channel::<RunEvent>();
        let active = Arc::new(AtomicBool::new(false));
        let worker_active = active.clone();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    RunnerCommand::Start { config, cancel } => {
                        let settings = ProbeSettings {
                            timeout: config.timeout,
                            ..settings.clone()
                        };
                        let sink = ChannelProgressSink::new(event_tx.clone());
                        let result = match HttpProber::new(settings) {
                            Ok(prober) => {
                                runtime.block_on(execute_run(&config, &prober, &sink, &cancel))
                            }
                            Err(err) => Err(RunError::ClientSetup(err.to_string())),
                        };
                        if result.is_err() {
                            let _ = event_tx.send(RunEvent::Stage(RunStage::Failed));
                        }
                        let _ = event_tx.send(RunEvent::Finished(result));
                        worker_active.store(false, Ordering::SeqCst);
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx,
            active,
            current_cancel: None,
        }
    }

    /// Start a run, returning a cancellation token for it. Rejected while
    /// another run is active on this handle.
    pub fn start(&mut self, config: RunConfig) -> Result<CancellationToken, RunError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(RunError::AlreadyRunning);
        }
        let cancel = CancellationToken::new();
        self.current_cancel = Some(cancel.clone());
        if self
            .cmd_tx
            .send(RunnerCommand::Start {
                config,
                cancel: cancel.clone(),
            })
            .is_err()
        {
            self.active.store(false, Ordering::SeqCst);
            return Err(RunError::ControllerGone);
        }
        Ok(cancel)
    }

    /// Request cancellation of the active run, if any. Not an error when
    /// no run is active.
    pub fn cancel(&self) {
        if let Some(token) = &self.current_cancel {
            token.cancel();
        }
    }

    /// Blocking receive of the next run event. `None` once the worker is
    /// gone.
    pub fn recv_event(&self) -> Option<RunEvent> {
        self.event_rx.recv().ok()
    }

    /// Non-blocking receive of the next run event.
    pub fn try_recv_event(&self) -> Option<RunEvent> {
        self.event_rx.try_recv().ok()
    }
}

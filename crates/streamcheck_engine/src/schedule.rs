use std::sync::mpsc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;

use streamcheck_core::{Channel, ProbeResult};

use crate::probe::Prober;
use crate::types::{Progress, RunEvent};

/// Receives run events as they happen. Implementations must be cheap;
/// they are called from the scheduler's completion loop.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: RunEvent);
}

/// Forwards events into an `mpsc` channel, dropping them once the
/// receiving side has gone away.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<RunEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<RunEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: RunEvent) {
        let _ = self.tx.send(event);
    }
}

/// Discards all events. Useful for one-off probes and tests.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: RunEvent) {}
}

/// Probe every channel with a bounded pool of in-flight requests.
///
/// A sliding window over [`FuturesUnordered`] keeps at most
/// `max_concurrent` probes running: the initial batch is seeded up to the
/// bound, then each completion starts at most one replacement. Progress
/// counters live in this single drain loop, so no cross-task
/// synchronization is needed for them.
///
/// Completion order is unordered relative to input, but every input
/// channel yields exactly one result unless cancellation is observed
/// first. Cancellation is checked before each new probe starts; probes
/// already in flight run to completion (bounded by the prober's timeout)
/// and their results are kept.
pub async fn probe_all(
    channels: Vec<Channel>,
    prober: &dyn Prober,
    max_concurrent: usize,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Vec<ProbeResult> {
    let total = channels.len();
    let bound = max_concurrent.max(1);
    let mut queue = channels.into_iter();
    let mut in_flight = FuturesUnordered::new();
    let mut results = Vec::with_capacity(total);
    let mut tested = 0usize;
    let mut working = 0usize;

    for channel in queue.by_ref().take(bound) {
        in_flight.push(probe_channel(prober, channel));
    }

    while let Some(result) = in_flight.next().await {
        tested += 1;
        if result.working {
            working += 1;
        }
        sink.emit(RunEvent::Progress(Progress {
            tested,
            total,
            working,
            current: Some(result.channel.name.clone()),
        }));
        results.push(result);

        if cancel.is_cancelled() {
            continue;
        }
        if let Some(channel) = queue.next() {
            in_flight.push(probe_channel(prober, channel));
        }
    }

    if cancel.is_cancelled() {
        log::info!("probing cancelled after {tested}/{total} channels");
    }
    results
}

async fn probe_channel(prober: &dyn Prober, channel: Channel) -> ProbeResult {
    let outcome = prober.probe(&channel.url).await;
    if !outcome.working {
        log::debug!(
            "{} failed: {}",
            channel.name,
            outcome.detail.as_deref().unwrap_or("unknown")
        );
    }
    ProbeResult {
        channel,
        working: outcome.working,
        status_detail: outcome.detail,
        elapsed_ms: outcome.elapsed.as_millis() as u64,
    }
}

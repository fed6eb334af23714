use serde::{Deserialize, Serialize};

/// One playlist entry: an `#EXTINF` line plus its URL line.
///
/// Channels carry no inherent identifier; identity is positional within a
/// playlist. For dedup purposes the `(name, url)` tuple is the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub url: String,
    pub group: Option<String>,
    pub logo: Option<String>,
    pub tvg_id: Option<String>,
    /// The `tvg-name` attribute, kept separate from the display name so
    /// serialization can round-trip it.
    pub tvg_name: Option<String>,
}

impl Channel {
    /// Dedup key: two entries with the same name and URL are considered
    /// the same channel across playlist files.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.name, &self.url)
    }
}

/// Verdict for a single probed channel. Created once per channel per run,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub channel: Channel,
    pub working: bool,
    /// Short human-readable cause when `working` is false
    /// (e.g. "timeout", "http status 404").
    pub status_detail: Option<String>,
    pub elapsed_ms: u64,
}

/// Per-category totals derived from a run's complete result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

/// Counters for one run. Invariants: `tested <= total` and
/// `working <= tested` at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total: usize,
    pub tested: usize,
    pub working: usize,
    pub cancelled: bool,
}

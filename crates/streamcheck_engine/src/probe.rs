use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, RANGE};
use reqwest::StatusCode;

/// Settings for the HTTP prober.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Overall time budget for one probe, covering the HEAD attempt and
    /// any ranged-GET fallback together.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            // Some stream hosts reject unknown clients outright.
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Verdict for one probed URL. Probes never fail upwards; every failure
/// mode is captured here as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub working: bool,
    /// Short cause when not working ("timeout", "http status 404", ...).
    pub detail: Option<String>,
    pub elapsed: Duration,
}

impl ProbeOutcome {
    fn working(elapsed: Duration) -> Self {
        Self {
            working: true,
            detail: None,
            elapsed,
        }
    }

    fn failed(detail: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            working: false,
            detail: Some(detail.into()),
            elapsed,
        }
    }
}

/// Liveness check for a single stream URL. One attempt per call; retry
/// policy, if any, belongs to the scheduler.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Reachability prober: HEAD first, falling back to a ranged GET when the
/// server rejects HEAD. A success-range status within the time budget
/// counts as working; status, transport and TLS failures all classify as
/// not working with a short cause.
pub struct HttpProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(settings: ProbeSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent)
            .build()?;
        Ok(Self {
            client,
            timeout: settings.timeout,
        })
    }

    async fn check(&self, url: &str) -> (bool, Option<String>) {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => {
                if let Some(ct) = response.headers().get(CONTENT_TYPE) {
                    log::debug!("HEAD {url}: content-type {:?}", ct);
                }
                (true, None)
            }
            // The server answered but disliked HEAD; retry as a partial GET.
            Ok(response) => self.ranged_get(url, response.status()).await,
            Err(err) => (false, Some(classify(&err))),
        }
    }

    async fn ranged_get(&self, url: &str, head_status: StatusCode) -> (bool, Option<String>) {
        log::debug!("HEAD {url} gave {head_status}, retrying with ranged GET");
        let request = self.client.get(url).header(RANGE, "bytes=0-512");
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || status == StatusCode::PARTIAL_CONTENT {
                    (true, None)
                } else {
                    (false, Some(format!("http status {}", status.as_u16())))
                }
            }
            Err(err) => (false, Some(classify(&err))),
        }
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let started = Instant::now();
        // The client timeout covers each request; this guard bounds the
        // HEAD-plus-fallback sequence as a whole.
        match tokio::time::timeout(self.timeout, self.check(url)).await {
            Ok((true, _)) => ProbeOutcome::working(started.elapsed()),
            Ok((false, detail)) => ProbeOutcome::failed(
                detail.unwrap_or_else(|| "unreachable".to_string()),
                started.elapsed(),
            ),
            Err(_) => ProbeOutcome::failed("timeout", started.elapsed()),
        }
    }
}

fn classify(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout".to_string()
    } else if err.is_connect() {
        "connect failed".to_string()
    } else if err.is_builder() {
        "invalid url".to_string()
    } else {
        format!("network error: {err}")
    }
}

//! Configuration structures for the SDK
//!
//! All tunables that the original bindings kept as global constants live
//! here as explicit configuration, passed into the services at
//! construction time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BEACONS_URL, DEFAULT_HTTP_ATTEMPTS, DEFAULT_HTTP_BACKOFF_MS, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_POLL_INTERVAL_MS,
};

/// Top-level SDK configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainsConfig {
    /// Base URL of the chains job service (the protocol version segment
    /// is appended by the client).
    pub chains_url: String,
    /// Base URL of the beacon service.
    #[serde(default = "default_beacons_url")]
    pub beacons_url: String,
    /// OAuth bearer token; absent in beacon-only deployments.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl ChainsConfig {
    /// Configuration for authenticated access to both services.
    pub fn new(
        token: impl Into<String>,
        chains_url: impl Into<String>,
        beacons_url: impl Into<String>,
    ) -> Self {
        Self {
            chains_url: chains_url.into(),
            beacons_url: beacons_url.into(),
            token: Some(token.into()),
            poll: PollConfig::default(),
            http: HttpConfig::default(),
        }
    }

    /// Configuration for token-less, beacon-only use.
    pub fn beacon_only(beacons_url: impl Into<String>) -> Self {
        Self {
            chains_url: String::new(),
            beacons_url: beacons_url.into(),
            token: None,
            poll: PollConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Job status polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Fixed wait between poll rounds, in milliseconds. The service's
    /// own job latency dominates, so there is no backoff here.
    pub interval_ms: u64,
    /// Optional bound on the total wait for one call; `None` polls
    /// until the job is terminal.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: DEFAULT_POLL_INTERVAL_MS, deadline_ms: None }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempt budget per call (initial try + retries).
    pub max_attempts: usize,
    /// Base backoff between transport-level retries, in milliseconds.
    pub base_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_ATTEMPTS,
            base_backoff_ms: DEFAULT_HTTP_BACKOFF_MS,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}

fn default_beacons_url() -> String {
    DEFAULT_BEACONS_URL.to_string()
}

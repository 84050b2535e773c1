//! Transport and readiness settings.

use serde::{Deserialize, Serialize};

/// HTTP transport settings for control requests.
///
/// One client is built from these per run and shared by every handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportSettings {
    /// Total time allowed for one control exchange, in milliseconds.
    pub request_timeout_ms: u64,
    /// Time allowed to establish the TCP connection, in milliseconds.
    pub connect_timeout_ms: u64,
    /// `User-Agent` header sent with every control request.
    pub user_agent: String,
    /// Maximum idle pooled connections kept per client port.
    pub pool_idle_per_host: usize,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
            user_agent: "chamber/0.1".to_string(),
            pool_idle_per_host: 4,
        }
    }
}

/// How to wait for a freshly launched client to accept connections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadinessSettings {
    /// Delay between connection attempts, in milliseconds.
    pub poll_interval_ms: u64,
    /// Give up after this long, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            timeout_ms: 10_000,
        }
    }
}

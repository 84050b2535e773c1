//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`,
//! so a settings file only needs the keys it wants to change.

mod transport;

pub use transport::*;

use serde::{Deserialize, Serialize};

/// Root settings type for Chamber.
///
/// Loaded from `~/.chamber/settings.json` with defaults applied for
/// missing fields. Environment variables can override specific values.
///
/// ```json
/// {
///   "transport": { "requestTimeoutMs": 2000 },
///   "readiness": { "timeoutMs": 30000 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChamberSettings {
    /// HTTP transport used for control calls.
    pub transport: TransportSettings,
    /// Polling used while waiting for a launched client to listen.
    pub readiness: ReadinessSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level passed to the `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

//! Error types for process launch, control requests and readiness waits.
//!
//! Errors are surfaced to the caller verbatim. Nothing here retries, and an
//! HTTP status code is never turned into an error.

use std::io;

use thiserror::Error;

/// The client process could not be launched.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The launch command does not exist.
    #[error("launch command not found: {command}")]
    NotFound {
        /// The command that was looked up.
        command: String,
    },

    /// The launch command exists but may not be executed.
    #[error("permission denied launching {command}")]
    PermissionDenied {
        /// The command that was refused.
        command: String,
    },

    /// Any other spawn failure (bad arguments, resource limits, ...).
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        /// The command being spawned.
        command: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// `start` was called without a Tokio runtime to drive the child.
    #[error("client '{identifier}' cannot be started outside a Tokio runtime")]
    NoRuntime {
        /// Identifier of the handle.
        identifier: String,
    },

    /// The handle already owns a process.
    #[error("client '{identifier}' has already been started")]
    AlreadyStarted {
        /// Identifier of the handle.
        identifier: String,
    },
}

impl ProcessError {
    /// Classify an I/O error returned by `spawn`.
    pub fn from_spawn(command: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                command: command.to_string(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                command: command.to_string(),
            },
            _ => Self::Spawn {
                command: command.to_string(),
                source: err,
            },
        }
    }
}

/// A control request did not complete.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The message body could not be encoded as JSON.
    #[error("failed to encode control message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The HTTP client could not be built from the transport settings.
    #[error("invalid transport settings: {0}")]
    Configure(#[source] reqwest::Error),

    /// The request could not be built.
    #[error("invalid control request to {url}: {source}")]
    Build {
        /// Target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// No connection could be made (nothing listening, refused, unreachable).
    #[error("could not connect to {url}: {source}")]
    Connect {
        /// Target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The transport's timeout elapsed before the exchange completed.
    #[error("control request to {url} timed out: {source}")]
    Timeout {
        /// Target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The exchange failed after connecting (reset, malformed reply, body read).
    #[error("control request to {url} failed: {source}")]
    Request {
        /// Target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Classify a `reqwest` error for the request sent to `url`.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_builder() {
            Self::Build { url, source: err }
        } else if err.is_timeout() {
            Self::Timeout { url, source: err }
        } else if err.is_connect() {
            Self::Connect { url, source: err }
        } else {
            Self::Request { url, source: err }
        }
    }

    /// The URL the failed request targeted, if one was formed.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Encode(_) | Self::Configure(_) => None,
            Self::Build { url, .. }
            | Self::Connect { url, .. }
            | Self::Timeout { url, .. }
            | Self::Request { url, .. } => Some(url),
        }
    }
}

/// A launched client never started accepting connections.
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// The port stayed closed for the whole wait.
    #[error("port {port} not accepting connections after {waited_ms}ms")]
    TimedOut {
        /// Port that was probed.
        port: u16,
        /// How long we waited.
        waited_ms: u64,
    },
}

//! The HTTP transport used for control calls.
//!
//! A transport is created once per run and shared by every handle through
//! `Arc<dyn ControlTransport>`. Timeouts and pooling are configured here and
//! nowhere else. Dropping the last reference closes its connection pool.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chamber_settings::TransportSettings;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::errors::TransportError;

/// Raw result of a completed control exchange.
///
/// The status and body bytes are passed through untouched. A 4xx or 5xx
/// reply is still a completed exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlResponse {
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header value.
    pub content_type: Option<String>,
    /// Response body exactly as received.
    pub body: Bytes,
}

impl ControlResponse {
    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends control requests to a client under test.
#[async_trait]
pub trait ControlTransport: Send + Sync {
    /// `POST` to `url`. With `Some(body)` the request carries
    /// `Content-Type: application/json`; with `None` it has no body and no
    /// content type.
    async fn post(&self, url: &str, body: Option<Vec<u8>>)
    -> Result<ControlResponse, TransportError>;
}

/// Control transport backed by a single `reqwest::Client`.
///
/// Cloning shares the underlying connection pool.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from settings.
    ///
    /// Fails with [`TransportError::Configure`] when the settings cannot be
    /// applied (e.g. a user agent that is not a valid header value).
    pub fn new(settings: &TransportSettings) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .user_agent(settings.user_agent.clone())
            .pool_max_idle_per_host(settings.pool_idle_per_host)
            .build()
            .map_err(TransportError::Configure)?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    /// Transport with compiled-default settings.
    ///
    /// Those settings are constant, so failure here means the TLS backend
    /// could not initialise; a plain client is used instead.
    fn default() -> Self {
        Self::new(&TransportSettings::default()).unwrap_or_else(|e| {
            warn!(error = %e, "default transport unavailable, using plain client");
            Self::from_client(reqwest::Client::default())
        })
    }
}

#[async_trait]
impl ControlTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ControlResponse, TransportError> {
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        debug!(url, status, "control exchange completed");

        Ok(ControlResponse {
            status,
            content_type,
            body,
        })
    }
}

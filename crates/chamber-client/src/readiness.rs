//! Waiting for a launched client to accept control connections.
//!
//! [`ClientHandle::start`](crate::ClientHandle::start) returns as soon as the
//! process is spawned. Call [`wait_until_ready`] before the first control call
//! so that call does not race the client's server startup.

use std::time::Duration;

use chamber_settings::ReadinessSettings;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::debug;

use crate::control::routes::CONTROL_HOST;
use crate::errors::ReadinessError;

/// Poll `localhost:{port}` until a TCP connection succeeds.
///
/// Returns how long the wait took. No HTTP request is made.
pub async fn wait_until_ready(
    port: u16,
    settings: &ReadinessSettings,
) -> Result<Duration, ReadinessError> {
    let started = Instant::now();
    let timeout = Duration::from_millis(settings.timeout_ms);
    let interval = Duration::from_millis(settings.poll_interval_ms.max(1));
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let remaining = timeout.saturating_sub(started.elapsed());
        let attempt = tokio::time::timeout(remaining, TcpStream::connect((CONTROL_HOST, port)));
        if let Ok(Ok(_stream)) = attempt.await {
            let waited = started.elapsed();
            let waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX);
            debug!(port, attempts, waited_ms, "client is accepting connections");
            return Ok(waited);
        }

        if started.elapsed() + interval > timeout {
            let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            debug!(port, attempts, waited_ms, "gave up waiting for client");
            return Err(ReadinessError::TimedOut { port, waited_ms });
        }
        tokio::time::sleep(interval).await;
    }
}

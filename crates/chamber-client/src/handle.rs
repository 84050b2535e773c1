//! Handle to one chat client under test.
//!
//! A [`ClientHandle`] binds a participant identifier, the port its HTTP
//! control server listens on, and the command that launches it. It owns the
//! launched process and issues the four control calls against that port.
//!
//! Construction has no side effects. Nothing is spawned until
//! [`start`](ClientHandle::start) and nothing touches the network until a
//! control call is made. The handle never waits for the client's server to
//! come up; see [`crate::readiness`] for that.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use serde::Serialize;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::control::{
    ControlResponse, ControlRoute, ControlTransport, JoinedMessage, PromptMessage,
    ReceivedMessage, ReqwestTransport, url_for,
};
use crate::errors::{ProcessError, TransportError};

/// Where a handle is in the advisory lifecycle.
///
/// Nothing checks it. [`start`](ClientHandle::start) refuses only when a
/// process is already owned, and control calls go to the wire in any state,
/// updating it when their exchange completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleState {
    /// No process has been launched.
    Unstarted,
    /// The process was spawned.
    Started,
    /// `/joined` was delivered.
    Joined,
    /// `/disconnect` was delivered.
    Disconnected,
}

/// One simulated participant: its process and its control endpoint.
pub struct ClientHandle {
    identifier: String,
    port: u16,
    launch_command: PathBuf,
    transport: Arc<dyn ControlTransport>,
    child: Option<Child>,
    state: HandleState,
}

impl ClientHandle {
    /// Create an unstarted handle with its own default transport.
    ///
    /// `port` must be the port the launched process is told to bind. That is
    /// not checked; a mismatch shows up as connection errors.
    pub fn new(
        launch_command: impl Into<PathBuf>,
        identifier: impl Into<String>,
        port: u16,
    ) -> Self {
        Self::with_transport(
            launch_command,
            identifier,
            port,
            Arc::new(ReqwestTransport::default()),
        )
    }

    /// Create an unstarted handle that sends through a shared transport.
    pub fn with_transport(
        launch_command: impl Into<PathBuf>,
        identifier: impl Into<String>,
        port: u16,
        transport: Arc<dyn ControlTransport>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            port,
            launch_command: launch_command.into(),
            transport,
            child: None,
            state: HandleState::Unstarted,
        }
    }

    /// Participant name used in every message this handle sends.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Port of the client's control server.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Executable launched by [`start`](Self::start).
    pub fn launch_command(&self) -> &Path {
        &self.launch_command
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Whether a process has been launched.
    pub fn is_started(&self) -> bool {
        self.child.is_some()
    }

    /// OS process id of the launched client, while it is known.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Process
    // ─────────────────────────────────────────────────────────────────────────

    /// Launch the client with `args`.
    ///
    /// Include the port in `args` if the client needs to be told where to
    /// listen. Output streams are inherited, not captured. Returns as soon as
    /// the process is spawned. The process is not killed when the handle is
    /// dropped.
    ///
    /// Must be called from within a Tokio runtime; outside one it fails with
    /// [`ProcessError::NoRuntime`]. A handle owns at most one process, so a
    /// second call after a successful spawn fails with
    /// [`ProcessError::AlreadyStarted`]. On failure no process is owned.
    pub fn start<I, S>(&mut self, args: I) -> Result<(), ProcessError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        if self.child.is_some() {
            return Err(ProcessError::AlreadyStarted {
                identifier: self.identifier.clone(),
            });
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(ProcessError::NoRuntime {
                identifier: self.identifier.clone(),
            });
        }

        let command_display = self.launch_command.display().to_string();
        let mut cmd = Command::new(&self.launch_command);
        let _ = cmd
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().map_err(|e| {
            warn!(
                identifier = %self.identifier,
                command = %command_display,
                error = %e,
                "failed to launch client"
            );
            ProcessError::from_spawn(&command_display, e)
        })?;

        debug!(
            identifier = %self.identifier,
            port = self.port,
            pid = ?child.id(),
            command = %command_display,
            "client launched"
        );

        self.child = Some(child);
        self.state = HandleState::Started;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Control protocol
    // ─────────────────────────────────────────────────────────────────────────

    /// `POST /joined`: tell the client it joined, and who was already there.
    pub async fn notify_joined<I, S>(
        &mut self,
        participants: I,
    ) -> Result<ControlResponse, TransportError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let message = JoinedMessage {
            identifier: self.identifier.clone(),
            participants: participants.into_iter().map(Into::into).collect(),
        };
        let response = self.post_json(ControlRoute::Joined, &message).await?;
        self.state = HandleState::Joined;
        Ok(response)
    }

    /// `POST /disconnect` with an empty body: ask the client to clean up and exit.
    ///
    /// This is a request, not a kill. The process is left to exit on its own.
    pub async fn disconnect(&mut self) -> Result<ControlResponse, TransportError> {
        let response = self.exchange(ControlRoute::Disconnect, None).await?;
        self.state = HandleState::Disconnected;
        Ok(response)
    }

    /// `POST /prompt`: ask this client to send `message` to `to`.
    ///
    /// The `from` field is always this handle's identifier.
    pub async fn prompt_send(
        &self,
        to: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<ControlResponse, TransportError> {
        let message = PromptMessage {
            from: self.identifier.clone(),
            to: to.into(),
            message: message.into(),
        };
        self.post_json(ControlRoute::Prompt, &message).await
    }

    /// `POST /received`: tell this client it received `message` from `from`,
    /// observed by the orchestrator at `when`.
    pub async fn notify_received(
        &self,
        from: impl Into<String>,
        message: impl Into<String>,
        when: impl Into<String>,
    ) -> Result<ControlResponse, TransportError> {
        let message = ReceivedMessage {
            from: from.into(),
            message: message.into(),
            when: when.into(),
        };
        self.post_json(ControlRoute::Received, &message).await
    }

    async fn post_json<T: Serialize + Sync>(
        &self,
        route: ControlRoute,
        message: &T,
    ) -> Result<ControlResponse, TransportError> {
        let body = serde_json::to_vec(message)?;
        self.exchange(route, Some(body)).await
    }

    async fn exchange(
        &self,
        route: ControlRoute,
        body: Option<Vec<u8>>,
    ) -> Result<ControlResponse, TransportError> {
        let url = url_for(self.port, route);
        debug!(
            identifier = %self.identifier,
            port = self.port,
            %route,
            "sending control request"
        );

        match self.transport.post(&url, body).await {
            Ok(response) => {
                debug!(
                    identifier = %self.identifier,
                    %route,
                    status = response.status,
                    "control request answered"
                );
                Ok(response)
            }
            Err(e) => {
                warn!(
                    identifier = %self.identifier,
                    port = self.port,
                    %route,
                    error = %e,
                    "control request failed"
                );
                Err(e)
            }
        }
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("identifier", &self.identifier)
            .field("port", &self.port)
            .field("launch_command", &self.launch_command)
            .field("pid", &self.pid())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

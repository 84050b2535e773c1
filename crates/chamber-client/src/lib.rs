//! # chamber-client
//!
//! Client handles for chat-protocol implementations under integration test.
//!
//! Each [`ClientHandle`] launches one client process and drives it through
//! its lifecycle by posting to the HTTP control server the client embeds:
//!
//! | Call | Route | Body |
//! |---|---|---|
//! | [`notify_joined`](ClientHandle::notify_joined) | `POST /joined` | [`JoinedMessage`] |
//! | [`prompt_send`](ClientHandle::prompt_send) | `POST /prompt` | [`PromptMessage`] |
//! | [`notify_received`](ClientHandle::notify_received) | `POST /received` | [`ReceivedMessage`] |
//! | [`disconnect`](ClientHandle::disconnect) | `POST /disconnect` | none |
//!
//! Handles do not sequence, retry or health-check anything. Ordering calls
//! across handles is the orchestrator's job.

#![deny(unsafe_code)]

pub mod control;
pub mod errors;
pub mod handle;
pub mod logging;
pub mod readiness;

pub use control::{
    ControlResponse, ControlRoute, ControlTransport, JoinedMessage, PromptMessage,
    ReceivedMessage, ReqwestTransport, url_for,
};
pub use errors::{ProcessError, ReadinessError, TransportError};
pub use handle::{ClientHandle, HandleState};
pub use readiness::wait_until_ready;

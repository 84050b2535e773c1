//! The HTTP control protocol spoken to clients under test.
//!
//! Every control call is a `POST` to `http://localhost:{port}/{route}`.
//! Calls that carry a body send one of the JSON [`messages`]; `disconnect`
//! sends nothing. Responses come back raw as a [`ControlResponse`].

pub mod messages;
pub mod routes;
pub mod transport;

pub use messages::{JoinedMessage, PromptMessage, ReceivedMessage};
pub use routes::{ControlRoute, url_for};
pub use transport::{ControlResponse, ControlTransport, ReqwestTransport};

//! Control routes and URL construction.

use std::fmt;

/// Host every controlled client listens on.
pub const CONTROL_HOST: &str = "localhost";

/// One of the four endpoints a client under test exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlRoute {
    /// `POST /joined` with a [`JoinedMessage`](super::JoinedMessage).
    Joined,
    /// `POST /disconnect` with no body.
    Disconnect,
    /// `POST /prompt` with a [`PromptMessage`](super::PromptMessage).
    Prompt,
    /// `POST /received` with a [`ReceivedMessage`](super::ReceivedMessage).
    Received,
}

impl ControlRoute {
    /// Every route, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Joined, Self::Prompt, Self::Received, Self::Disconnect];

    /// Path segment, without a leading slash.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Joined => "joined",
            Self::Disconnect => "disconnect",
            Self::Prompt => "prompt",
            Self::Received => "received",
        }
    }
}

impl fmt::Display for ControlRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())
    }
}

/// Build the control URL for `route` on a client listening on `port`.
pub fn url_for(port: u16, route: ControlRoute) -> String {
    format!("http://{CONTROL_HOST}:{port}/{}", route.path())
}

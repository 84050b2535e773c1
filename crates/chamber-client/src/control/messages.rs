//! JSON payloads posted to clients under test.
//!
//! Field names are the wire contract; they are serialized exactly as
//! declared, with no renaming.

use serde::{Deserialize, Serialize};

/// Body of `POST /joined`: who joined, and who was already present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedMessage {
    /// Identifier of the joining client.
    pub identifier: String,
    /// Participants already in the simulation, excluding the joining one.
    pub participants: Vec<String>,
}

/// Body of `POST /prompt`: ask a client to originate a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// The prompted client itself.
    pub from: String,
    /// Identifier of the intended recipient.
    pub to: String,
    /// Message content.
    pub message: String,
}

/// Body of `POST /received`: tell a client a message was delivered to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    /// Identifier of the sender.
    pub from: String,
    /// Message content.
    pub message: String,
    /// When the orchestrator observed the message, as a timestamp string.
    pub when: String,
}

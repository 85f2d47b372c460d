//! Native bridge event and payload types.
//!
//! The bridge is a two-channel, message-typed, fire-and-forget boundary
//! between the widget and the host process. Outbound events ride a single
//! `postNativeMessage(event, payload)` primitive; inbound calls arrive as
//! `(callable name, JSON string)` pairs. No request/response correlation
//! exists in either direction.

use crate::message::{Message, Sender};
use serde::{Deserialize, Serialize};

/// An outbound notification from the widget to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// A fetched message was merged into the store.
    ReceiveMessage(Message),
    /// The widget has mounted and all inbound handlers are installed.
    ///
    /// The host may begin pushing state immediately after observing this.
    Ready,
    /// Development-time hot-reload signal.
    Reload,
}

impl OutboundEvent {
    /// The event name the host dispatches on.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::ReceiveMessage(_) => "receiveMessage",
            OutboundEvent::Ready => "ready",
            OutboundEvent::Reload => "reload",
        }
    }

    /// Serializes the payload string for this event.
    ///
    /// `ready` and `reload` carry no payload and encode to the empty
    /// string.
    pub fn payload(&self) -> serde_json::Result<String> {
        match self {
            OutboundEvent::ReceiveMessage(msg) => serde_json::to_string(msg),
            OutboundEvent::Ready | OutboundEvent::Reload => Ok(String::new()),
        }
    }
}

/// The inbound callables the widget registers at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundCall {
    /// `__sendMessage__`: host-originated user input, forwarded to the
    /// sync engine's send operation.
    SendMessage,
    /// `__receiveStateChange__`: partial state snapshot.
    StateChange,
    /// `__receiveMessage__`: a single host-pushed message, appended to
    /// the store without touching the polling cursor.
    ReceiveMessage,
    /// `__receiveError__`: an opaque error value for the error banner.
    ReceiveError,
}

impl InboundCall {
    /// The callable name the host invokes.
    pub fn name(&self) -> &'static str {
        match self {
            InboundCall::SendMessage => "__sendMessage__",
            InboundCall::StateChange => "__receiveStateChange__",
            InboundCall::ReceiveMessage => "__receiveMessage__",
            InboundCall::ReceiveError => "__receiveError__",
        }
    }

    /// Resolves a callable name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "__sendMessage__" => Some(InboundCall::SendMessage),
            "__receiveStateChange__" => Some(InboundCall::StateChange),
            "__receiveMessage__" => Some(InboundCall::ReceiveMessage),
            "__receiveError__" => Some(InboundCall::ReceiveError),
            _ => None,
        }
    }

    /// All callables, in registration order.
    pub fn all() -> [InboundCall; 4] {
        [
            InboundCall::SendMessage,
            InboundCall::StateChange,
            InboundCall::ReceiveMessage,
            InboundCall::ReceiveError,
        ]
    }
}

/// Payload of `__sendMessage__`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessagePayload {
    /// Message body to send.
    pub message: String,
    /// Display name to send under.
    pub username: String,
}

/// Payload of `__receiveStateChange__`.
///
/// Absent fields leave the corresponding store field unchanged; this is a
/// partial merge, not a full replace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChangePayload {
    /// Replacement message list, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    /// Replacement current user, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

/// Payload of `__receiveMessage__`.
///
/// The host's single-message push names the ordering key `timestamp`
/// rather than `createdAt`, and may omit the username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMessagePayload {
    /// Message author.
    pub sender: Sender,
    /// Message body.
    pub text: String,
    /// Ordering key (epoch milliseconds).
    pub timestamp: i64,
    /// Display name, if the host knows it.
    #[serde(default)]
    pub username: String,
}

impl From<HostMessagePayload> for Message {
    fn from(payload: HostMessagePayload) -> Self {
        Message {
            sender: payload.sender,
            username: payload.username,
            text: payload.text,
            created_at: payload.timestamp,
        }
    }
}

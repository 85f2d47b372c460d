//! Request and response bodies for the backend endpoints.

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Body of `POST {base_url}/messages/send`.
///
/// The backend assigns the timestamp and echoes the message back through
/// the ordered log; the response body carries no information beyond the
/// success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Display name of the sender.
    pub nickname: String,
    /// Message body.
    pub message: String,
}

impl SendRequest {
    /// Creates a send request.
    pub fn new(nickname: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            message: message.into(),
        }
    }
}

/// Body of `POST {base_url}/messages/get`.
///
/// Asks for every message with `createdAt` strictly greater than
/// `from_timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// The caller's cursor.
    pub from_timestamp: i64,
}

impl FetchRequest {
    /// Creates a fetch request from a cursor value.
    pub fn new(from_timestamp: i64) -> Self {
        Self { from_timestamp }
    }
}

/// Response body of the fetch endpoint.
///
/// `messages` is ordered ascending by `createdAt`; an empty array is a
/// valid, non-error response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// New messages, ascending by `createdAt`.
    pub messages: Vec<Message>,
}

impl FetchResponse {
    /// Creates a fetch response.
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// The `createdAt` of the last message in the batch, if any.
    ///
    /// This is the value the caller's cursor advances to after a
    /// successful non-empty fetch.
    pub fn last_timestamp(&self) -> Option<i64> {
        self.messages.last().map(|m| m.created_at)
    }
}

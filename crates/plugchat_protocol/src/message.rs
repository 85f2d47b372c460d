//! The chat message model.

use serde::{Deserialize, Serialize};

/// Who authored a message, as seen by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The local user of this widget instance.
    User,
    /// Any other participant, echoed back by the backend.
    Remote,
}

/// A single chat message.
///
/// `created_at` is the backend-assigned ordering key in epoch milliseconds.
/// It is monotonically non-decreasing across the log as observed by any
/// single reader. Messages are immutable once created; there is no update
/// or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message author.
    pub sender: Sender,
    /// Display name of the author.
    #[serde(default)]
    pub username: String,
    /// Message body.
    pub text: String,
    /// Backend-assigned ordering key (epoch milliseconds).
    pub created_at: i64,
}

impl Message {
    /// Creates a message.
    pub fn new(
        sender: Sender,
        username: impl Into<String>,
        text: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            sender,
            username: username.into(),
            text: text.into(),
            created_at,
        }
    }

    /// Returns the dedup identity of this message.
    ///
    /// Timestamps are not guaranteed unique, so identity also covers the
    /// sender and the text.
    pub fn key(&self) -> MessageKey {
        MessageKey {
            created_at: self.created_at,
            sender: self.sender,
            text: self.text.clone(),
        }
    }
}

/// Identity used to reconcile overlapping fetch batches.
///
/// Two messages with equal keys are the same message; merging a message
/// whose key is already known must be a no-op.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageKey {
    /// Backend ordering key.
    pub created_at: i64,
    /// Message author.
    pub sender: Sender,
    /// Message body.
    pub text: String,
}

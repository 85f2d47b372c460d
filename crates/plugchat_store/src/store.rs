//! The reconciled chat state.

use parking_lot::RwLock;
use plugchat_protocol::{Message, MessageKey};
use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc::Receiver;
use tracing::debug;

use crate::feed::{StoreEvent, StoreFeed};

/// Default display name until a host snapshot supplies one.
pub const DEFAULT_USER: &str = "Ostin";

/// The user-visible error, driven into an error banner by the
/// presentation layer and dismissible through [`StateStore::clear_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Human-readable description.
    pub message: String,
}

impl ErrorInfo {
    /// Creates an error from any printable value.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<String> for ErrorInfo {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ErrorInfo {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[derive(Debug)]
struct StoreState {
    messages: Vec<Message>,
    seen: HashSet<MessageKey>,
    current_user: String,
    error: Option<ErrorInfo>,
}

/// The single source of truth for rendering.
///
/// Three independent write paths feed it: sync-engine merges, host-pushed
/// snapshots/messages, and host-pushed errors. Reads are synchronous
/// snapshots of the latest committed value; every mutation that changes
/// state emits a [`StoreEvent`] in commit order.
pub struct StateStore {
    state: RwLock<StoreState>,
    feed: StoreFeed,
}

impl StateStore {
    /// Creates an empty store with the default user.
    pub fn new() -> Self {
        Self::with_user(DEFAULT_USER)
    }

    /// Creates an empty store with a specific current user.
    pub fn with_user(current_user: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                messages: Vec::new(),
                seen: HashSet::new(),
                current_user: current_user.into(),
                error: None,
            }),
            feed: StoreFeed::new(),
        }
    }

    /// Appends a message unless its identity is already known.
    ///
    /// Returns `true` if the message was accepted. Merging an
    /// already-seen message is a no-op, which is what reconciles
    /// overlapping fetch batches from racing polls.
    pub fn append(&self, message: Message) -> bool {
        let accepted = {
            let mut state = self.state.write();
            if !state.seen.insert(message.key()) {
                false
            } else {
                state.messages.push(message.clone());
                true
            }
        };

        if accepted {
            self.feed.emit(StoreEvent::MessageAppended(message));
        } else {
            debug!(created_at = message.created_at, "dropped duplicate message");
        }
        accepted
    }

    /// Applies a partial host snapshot.
    ///
    /// Fields that are `None` are left unchanged. A present `messages`
    /// list replaces the store wholesale and resets the dedup identity
    /// set to the snapshot's contents.
    pub fn apply_snapshot(&self, messages: Option<Vec<Message>>, current_user: Option<String>) {
        let mut events = Vec::new();
        {
            let mut state = self.state.write();
            if let Some(messages) = messages {
                state.seen = messages.iter().map(Message::key).collect();
                events.push(StoreEvent::MessagesReplaced {
                    count: messages.len(),
                });
                state.messages = messages;
            }
            if let Some(user) = current_user {
                if user != state.current_user {
                    state.current_user = user.clone();
                    events.push(StoreEvent::CurrentUserChanged(user));
                }
            }
        }
        for event in events {
            self.feed.emit(event);
        }
    }

    /// Sets the error field.
    pub fn set_error(&self, error: impl Into<ErrorInfo>) {
        let error = error.into();
        self.state.write().error = Some(error.clone());
        self.feed.emit(StoreEvent::ErrorSet(error));
    }

    /// Clears the error field only.
    ///
    /// This is the presentation layer's dismiss action; no other state is
    /// touched.
    pub fn clear_error(&self) {
        let was_set = self.state.write().error.take().is_some();
        if was_set {
            self.feed.emit(StoreEvent::ErrorCleared);
        }
    }

    /// Snapshot of the current message list.
    pub fn messages(&self) -> Vec<Message> {
        self.state.read().messages.clone()
    }

    /// The current user's display name.
    pub fn current_user(&self) -> String {
        self.state.read().current_user.clone()
    }

    /// The current error, if any.
    pub fn error(&self) -> Option<ErrorInfo> {
        self.state.read().error.clone()
    }

    /// Number of messages in the store.
    pub fn len(&self) -> usize {
        self.state.read().messages.len()
    }

    /// Returns true if the store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.state.read().messages.is_empty()
    }

    /// Subscribes to store mutations.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.feed.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

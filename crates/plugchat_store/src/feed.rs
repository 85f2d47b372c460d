//! Change feed for observing store mutations.
//!
//! The feed emits one event per committed store mutation, in commit
//! order, enabling reactive UI updates without polling the store.

use parking_lot::RwLock;
use plugchat_protocol::Message;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::store::ErrorInfo;

/// A single change event from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A message was appended (from a fetch merge or a host push).
    MessageAppended(Message),
    /// A host snapshot replaced the message list wholesale.
    MessagesReplaced {
        /// Number of messages in the replacement list.
        count: usize,
    },
    /// The current user changed.
    CurrentUserChanged(String),
    /// The error field was set.
    ErrorSet(ErrorInfo),
    /// The error field was cleared by the presentation layer.
    ErrorCleared,
}

/// Distributes store events to subscribers.
///
/// The feed:
/// - Emits only committed mutations
/// - Preserves commit order
/// - Supports multiple subscribers
/// - Is thread-safe
pub struct StoreFeed {
    subscribers: RwLock<Vec<Sender<StoreEvent>>>,
}

impl StoreFeed {
    /// Creates a new feed with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribes to the feed.
    ///
    /// Returns a receiver that will receive all future store events. The
    /// receiver should be drained regularly to avoid unbounded growth.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Emits an event to all subscribers.
    ///
    /// Disconnected subscribers are pruned.
    pub fn emit(&self, event: StoreEvent) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for StoreFeed {
    fn default() -> Self {
        Self::new()
    }
}

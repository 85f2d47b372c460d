//! Outbound notifications to the host.

use crate::error::{BridgeError, BridgeResult};
use parking_lot::Mutex;
use plugchat_protocol::OutboundEvent;
use tracing::trace;

/// The host's `postNativeMessage(event, payload)` primitive.
///
/// Implement this for the actual host integration; the widget only ever
/// talks to the host through it. Calls are fire-and-forget.
pub trait NativeSink: Send + Sync {
    /// Posts one event to the host.
    fn post(&self, event: &str, payload: &str);

    /// Serializes and posts a typed event.
    fn post_event(&self, event: &OutboundEvent) -> BridgeResult<()> {
        let payload = event.payload().map_err(|source| BridgeError::Encode {
            event: event.name(),
            source,
        })?;
        trace!(event = event.name(), "posting native message");
        self.post(event.name(), &payload);
        Ok(())
    }
}

/// A sink that records every posted event, for tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    posted: Mutex<Vec<(String, String)>>,
}

impl CollectingSink {
    /// Creates an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything posted so far, in order.
    pub fn posted(&self) -> Vec<(String, String)> {
        self.posted.lock().clone()
    }

    /// Names of all posted events, in order.
    pub fn event_names(&self) -> Vec<String> {
        self.posted.lock().iter().map(|(e, _)| e.clone()).collect()
    }

    /// Number of posted events with the given name.
    pub fn count(&self, event: &str) -> usize {
        self.posted.lock().iter().filter(|(e, _)| e == event).count()
    }
}

impl NativeSink for CollectingSink {
    fn post(&self, event: &str, payload: &str) {
        self.posted.lock().push((event.into(), payload.into()));
    }
}

/// A sink that discards everything.
///
/// Useful when the widget runs without a host, e.g. the headless CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NativeSink for NullSink {
    fn post(&self, _event: &str, _payload: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugchat_protocol::{Message, Sender};

    #[test]
    fn typed_emission() {
        let sink = CollectingSink::new();
        let msg = Message::new(Sender::Remote, "ana", "hi", 42);

        sink.post_event(&OutboundEvent::ReceiveMessage(msg)).unwrap();
        sink.post_event(&OutboundEvent::Ready).unwrap();

        let posted = sink.posted();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].0, "receiveMessage");
        assert!(posted[0].1.contains("\"createdAt\":42"));
        assert_eq!(posted[1], ("ready".into(), String::new()));
    }

    #[test]
    fn count_by_event_name() {
        let sink = CollectingSink::new();
        sink.post("receiveMessage", "{}");
        sink.post("receiveMessage", "{}");
        sink.post("ready", "");
        assert_eq!(sink.count("receiveMessage"), 2);
        assert_eq!(sink.count("ready"), 1);
        assert_eq!(sink.count("reload"), 0);
    }
}

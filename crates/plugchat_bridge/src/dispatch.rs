//! Inbound callable dispatch.

use crate::error::{BridgeError, BridgeResult};
use parking_lot::Mutex;
use plugchat_protocol::{
    HostMessagePayload, InboundCall, SendMessagePayload, StateChangePayload,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// The effects the four inbound callables can have.
///
/// The widget runtime implements this once, wiring the calls into the
/// sync engine and the state store; the dispatcher owns the parsing and
/// the malformed-payload policy so implementations only ever see valid
/// payloads.
pub trait BridgeHandlers: Send + Sync {
    /// `__sendMessage__`: host-originated user input.
    fn on_send_message(&self, payload: SendMessagePayload);

    /// `__receiveStateChange__`: partial state snapshot.
    fn on_state_change(&self, payload: StateChangePayload);

    /// `__receiveMessage__`: a single host-pushed message.
    fn on_message(&self, payload: HostMessagePayload);

    /// `__receiveError__`: an opaque error value.
    ///
    /// The value is deliberately not parsed; whatever the host sent is
    /// surfaced verbatim.
    fn on_error(&self, error: String);
}

/// Routes `(callable name, raw payload)` pairs from the host adapter to a
/// [`BridgeHandlers`] implementation.
///
/// All handlers are installed at construction, so a dispatcher that
/// exists is fully registered; the runtime relies on this when it orders
/// registration before the `ready` event.
pub struct BridgeDispatcher {
    handlers: Arc<dyn BridgeHandlers>,
}

impl BridgeDispatcher {
    /// Creates a dispatcher with all four callables installed.
    pub fn new(handlers: Arc<dyn BridgeHandlers>) -> Self {
        Self { handlers }
    }

    /// Dispatches one inbound call.
    ///
    /// A parse failure is a dropped event: it is logged, reported in the
    /// returned error, and leaves all state untouched. Nothing here
    /// panics on host input.
    pub fn dispatch(&self, name: &str, payload: &str) -> BridgeResult<()> {
        let Some(call) = InboundCall::from_name(name) else {
            warn!(callable = name, "ignoring unknown bridge callable");
            return Err(BridgeError::UnknownCallable(name.to_string()));
        };

        debug!(callable = call.name(), "dispatching bridge call");
        match call {
            InboundCall::SendMessage => {
                self.handlers.on_send_message(parse(call, payload)?);
            }
            InboundCall::StateChange => {
                self.handlers.on_state_change(parse(call, payload)?);
            }
            InboundCall::ReceiveMessage => {
                self.handlers.on_message(parse(call, payload)?);
            }
            InboundCall::ReceiveError => {
                self.handlers.on_error(payload.to_string());
            }
        }
        Ok(())
    }
}

fn parse<T: serde::de::DeserializeOwned>(call: InboundCall, payload: &str) -> BridgeResult<T> {
    serde_json::from_str(payload).map_err(|source| {
        warn!(
            callable = call.name(),
            error = %source,
            "dropping malformed bridge payload"
        );
        BridgeError::MalformedPayload {
            callable: call.name(),
            source,
        }
    })
}

/// A handler implementation that records every call, for tests.
#[derive(Debug, Default)]
pub struct RecordingHandlers {
    /// Received `__sendMessage__` payloads.
    pub sends: Mutex<Vec<SendMessagePayload>>,
    /// Received `__receiveStateChange__` payloads.
    pub state_changes: Mutex<Vec<StateChangePayload>>,
    /// Received `__receiveMessage__` payloads.
    pub messages: Mutex<Vec<HostMessagePayload>>,
    /// Received `__receiveError__` values.
    pub errors: Mutex<Vec<String>>,
}

impl RecordingHandlers {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BridgeHandlers for RecordingHandlers {
    fn on_send_message(&self, payload: SendMessagePayload) {
        self.sends.lock().push(payload);
    }

    fn on_state_change(&self, payload: StateChangePayload) {
        self.state_changes.lock().push(payload);
    }

    fn on_message(&self, payload: HostMessagePayload) {
        self.messages.lock().push(payload);
    }

    fn on_error(&self, error: String) {
        self.errors.lock().push(error);
    }
}

//! The embeddable widget runtime.

use crate::error::ClientResult;
use plugchat_bridge::{BridgeDispatcher, BridgeHandlers, NativeSink};
use plugchat_protocol::{
    HostMessagePayload, Message, OutboundEvent, SendMessagePayload, StateChangePayload,
};
use plugchat_store::{ErrorInfo, StateStore, StoreEvent};
use plugchat_sync::{
    spawn_poll_loop, ChatTransport, HttpTransport, ReqwestClient, SyncConfig, SyncEngine,
};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// The complete widget runtime, as embedded by a host.
///
/// Owns the state store, the sync engine, the bridge dispatcher and the
/// background poll task. Construction wires everything and announces
/// `ready` last, so by the time the host sees the event every inbound
/// callable is already routable.
///
/// Dropping the client stops the poll loop.
pub struct ChatClient<T: ChatTransport + 'static> {
    engine: SyncEngine<T>,
    store: Arc<StateStore>,
    dispatcher: BridgeDispatcher,
    // Only the dev-only reload emit posts after construction.
    #[cfg(debug_assertions)]
    sink: Arc<dyn NativeSink>,
    poll: JoinHandle<()>,
}

impl<T: ChatTransport + 'static> ChatClient<T> {
    /// Builds and starts a runtime over the given transport.
    ///
    /// Must be called within a tokio runtime; the poll loop is spawned
    /// here. The first periodic fetch fires one interval in, matching
    /// the cadence hosts expect from the widget.
    pub fn new(config: SyncConfig, transport: T, sink: Arc<dyn NativeSink>) -> Self {
        let store = Arc::new(StateStore::new());
        let engine = SyncEngine::new(config, transport, store.clone(), sink.clone());
        let handlers = Arc::new(RuntimeHandlers {
            engine: engine.clone(),
            store: store.clone(),
        });
        let dispatcher = BridgeDispatcher::new(handlers);
        let poll = spawn_poll_loop(engine.clone());

        // Handlers are installed and the loop is running; only now may
        // the host learn we exist.
        if let Err(e) = sink.post_event(&OutboundEvent::Ready) {
            warn!(error = %e, "failed to post ready event");
        }
        info!(user = %store.current_user(), "chat client started");

        Self {
            engine,
            store,
            dispatcher,
            #[cfg(debug_assertions)]
            sink,
            poll,
        }
    }

    /// Routes one inbound callable from the host.
    pub fn dispatch(&self, name: &str, payload: &str) -> ClientResult<()> {
        self.dispatcher.dispatch(name, payload)?;
        Ok(())
    }

    /// Sends a message as the current user and awaits the outcome.
    ///
    /// This is the programmatic equivalent of the host's
    /// `__sendMessage__` callable.
    pub async fn send(&self, text: &str) -> ClientResult<()> {
        let username = self.store.current_user();
        self.engine.send(&username, text).await?;
        Ok(())
    }

    /// The shared state store.
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// The sync engine.
    pub fn engine(&self) -> &SyncEngine<T> {
        &self.engine
    }

    /// Current message list, in merge order.
    pub fn messages(&self) -> Vec<Message> {
        self.store.messages()
    }

    /// Current display name.
    pub fn current_user(&self) -> String {
        self.store.current_user()
    }

    /// Current error, if any.
    pub fn error(&self) -> Option<ErrorInfo> {
        self.store.error()
    }

    /// Clears the current error, typically after the host displayed it.
    pub fn clear_error(&self) {
        self.store.clear_error();
    }

    /// Subscribes to store change events.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.store.subscribe()
    }

    /// Asks the host to reload the widget surface.
    ///
    /// Development builds only; release hosts never see this event.
    #[cfg(debug_assertions)]
    pub fn reload(&self) {
        if let Err(e) = self.sink.post_event(&OutboundEvent::Reload) {
            warn!(error = %e, "failed to post reload event");
        }
    }
}

impl ChatClient<HttpTransport<ReqwestClient>> {
    /// Builds a runtime against a live HTTP backend.
    pub fn connect(config: SyncConfig, sink: Arc<dyn NativeSink>) -> Self {
        let transport = HttpTransport::new(config.base_url.clone(), ReqwestClient::new());
        Self::new(config, transport, sink)
    }
}

impl<T: ChatTransport + 'static> Drop for ChatClient<T> {
    fn drop(&mut self) {
        self.poll.abort();
    }
}

/// The one [`BridgeHandlers`] implementation: inbound callables land on
/// the engine and the store.
struct RuntimeHandlers<T: ChatTransport + 'static> {
    engine: SyncEngine<T>,
    store: Arc<StateStore>,
}

impl<T: ChatTransport + 'static> BridgeHandlers for RuntimeHandlers<T> {
    fn on_send_message(&self, payload: SendMessagePayload) {
        let username = if payload.username.is_empty() {
            self.store.current_user()
        } else {
            payload.username
        };
        let engine = self.engine.clone();
        // The host call is fire-and-forget; failures surface through
        // the store's error field like every other send failure.
        tokio::spawn(async move {
            let _ = engine.send(&username, &payload.message).await;
        });
    }

    fn on_state_change(&self, payload: StateChangePayload) {
        self.store
            .apply_snapshot(payload.messages, payload.current_user);
    }

    fn on_message(&self, payload: HostMessagePayload) {
        // Host pushes bypass the backend log, so the cursor is not
        // consulted and not moved; a later fetch of the same message
        // dedups against this one.
        self.store.append(Message::from(payload));
    }

    fn on_error(&self, error: String) {
        self.store.set_error(error);
    }
}

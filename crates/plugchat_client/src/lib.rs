//! # plugchat client
//!
//! The widget runtime: wires the bridge, the state store and the sync
//! engine into one embeddable unit.
//!
//! A [`ChatClient`] is what a host embeds. On construction it installs
//! all four inbound bridge handlers, starts the periodic poll loop and
//! then announces itself with a single `ready` event, in that order, so
//! the host can never call into a half-wired runtime.
//!
//! The host feeds inbound callables to [`ChatClient::dispatch`] and
//! receives outbound events through the [`NativeSink`] it supplied.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod runtime;

pub use error::{ClientError, ClientResult};
pub use runtime::ChatClient;

pub use plugchat_bridge::{CollectingSink, NativeSink, NullSink};
pub use plugchat_store::{ErrorInfo, StateStore, StoreEvent};
pub use plugchat_sync::{RetryPolicy, SyncConfig};

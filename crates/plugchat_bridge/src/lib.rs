//! # plugchat bridge
//!
//! The two-way, message-typed boundary between the widget and the native
//! host process.
//!
//! This crate provides:
//! - [`NativeSink`]: the outbound `postNativeMessage(event, payload)`
//!   primitive, with typed emission of [`OutboundEvent`]s
//! - [`BridgeDispatcher`]: routes the four named inbound callables to a
//!   [`BridgeHandlers`] implementation
//! - [`CollectingSink`] and [`RecordingHandlers`] test doubles
//!
//! Every call in either direction is a one-way notification; there is no
//! request/response correlation. A malformed inbound payload is a dropped
//! event with a logged error, never a crash.
//!
//! [`OutboundEvent`]: plugchat_protocol::OutboundEvent

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dispatch;
mod error;
mod outbound;

pub use dispatch::{BridgeDispatcher, BridgeHandlers, RecordingHandlers};
pub use error::{BridgeError, BridgeResult};
pub use outbound::{CollectingSink, NativeSink, NullSink};

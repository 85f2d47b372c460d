//! # plugchat protocol
//!
//! Message model, HTTP wire types and native-bridge payloads for plugchat.
//!
//! This crate provides:
//! - [`Message`] and its dedup identity [`MessageKey`]
//! - Request/response bodies for the backend's send and fetch endpoints
//! - Typed outbound bridge events and inbound callable payloads
//!
//! Everything on the wire and across the bridge is JSON with camelCase
//! field names. This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bridge;
mod message;
mod wire;

pub use bridge::{
    HostMessagePayload, InboundCall, OutboundEvent, SendMessagePayload, StateChangePayload,
};
pub use message::{Message, MessageKey, Sender};
pub use wire::{FetchRequest, FetchResponse, SendRequest};

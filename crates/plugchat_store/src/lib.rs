//! # plugchat store
//!
//! The reconciled, UI-facing view of the conversation.
//!
//! This crate provides:
//! - [`StateStore`]: `{ messages, current_user, error }`, the single source
//!   of truth the presentation layer renders from
//! - [`StoreFeed`]: a change feed so the presentation layer can react to
//!   store mutations without polling
//!
//! The store has exactly four write paths (sync-engine merges, host
//! snapshots, host single messages and host errors), plus an error reset
//! for the presentation layer. Messages are deduplicated on append by
//! their `(createdAt, sender, text)` identity, so overlapping fetch
//! batches reconcile to a single entry.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod feed;
mod store;

pub use feed::{StoreEvent, StoreFeed};
pub use store::{ErrorInfo, StateStore, DEFAULT_USER};

//! # plugchat sync
//!
//! The sync engine: cursor-based polling against the remote message
//! store, the send/receive coupling, and the retry policy on failure.
//!
//! This crate provides:
//! - [`SyncEngine`]: the send and fetch operations around a monotonic
//!   polling cursor
//! - [`ChatTransport`] / [`HttpTransport`] / [`HttpClient`]: the layered
//!   transport seam, with [`MockTransport`] and a loopback pair for tests
//! - [`RetryPolicy`]: the one-shot delayed retry, decoupled from the
//!   periodic ticker
//! - [`spawn_poll_loop`]: the recurring fetch driver
//!
//! ## Key invariants
//!
//! - The cursor only ever moves forward, to the max `createdAt` merged
//!   so far
//! - A failed fetch never touches the cursor
//! - Every successful send is followed by one out-of-band fetch, so the
//!   sender's own message round-trips through the ordered log
//! - No failure is fatal: the periodic ticker is the backstop that
//!   resumes progress after any transient error

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod http;
mod scheduler;
mod transport;

pub use config::{RetryPolicy, SyncConfig};
pub use engine::{SyncEngine, SyncStats};
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpResponse, HttpTransport, LoopbackClient, LoopbackServer, ReqwestClient};
pub use scheduler::spawn_poll_loop;
pub use transport::{ChatTransport, MockTransport};

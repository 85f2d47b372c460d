//! Client-level errors.

use plugchat_bridge::BridgeError;
use plugchat_sync::SyncError;
use thiserror::Error;

/// Errors surfaced by the widget runtime.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An inbound bridge call could not be dispatched.
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// A backend operation failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

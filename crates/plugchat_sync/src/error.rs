//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// Nothing here is fatal to the engine: a failed send is abandoned, a
/// failed fetch is retried once and then left to the periodic ticker.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// Network or connection error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The backend answered with a non-2xx status.
    #[error("unexpected status {code} from backend")]
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// A request body failed to encode or a response body failed to
    /// decode.
    #[error("codec error: {0}")]
    Codec(String),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if a delayed retry of this error makes sense.
    ///
    /// Non-2xx statuses and undecodable response bodies are treated
    /// exactly like transport failures: a malformed answer usually means
    /// the backend is mid-deploy or proxied to an error page, and the
    /// retry is one-shot, so a deterministic failure costs one extra
    /// attempt before the ticker takes over.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Status { .. } => true,
            SyncError::Codec(_) => true,
        }
    }
}

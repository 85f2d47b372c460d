//! Error types for the bridge.

use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur at the bridge boundary.
///
/// None of these are fatal: a failed inbound call is a dropped event, and
/// the dispatcher stays usable.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The host invoked a callable the widget never registered.
    #[error("unknown bridge callable: {0}")]
    UnknownCallable(String),

    /// An inbound payload failed to parse.
    #[error("malformed payload for {callable}: {source}")]
    MalformedPayload {
        /// The callable whose payload was rejected.
        callable: &'static str,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// An outbound payload failed to serialize.
    #[error("failed to encode outbound {event} payload: {source}")]
    Encode {
        /// The event being emitted.
        event: &'static str,
        /// The underlying serialization error.
        source: serde_json::Error,
    },
}

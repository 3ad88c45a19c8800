//! Error types for the radar runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the radar runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured remote address is in a private range; the session
    /// refuses to dial it.
    #[error(
        "a public address is required: '{host}' is a private/local address"
    )]
    PrivateAddress { host: String },

    /// The WebSocket connection attempt failed.
    #[error("WebSocket connection to '{url}' failed: {reason}. Check the address and try again")]
    ConnectFailed { url: String, reason: String },

    /// No open signal arrived within the configured timeout.
    #[error("connection to '{url}' timed out after {timeout_ms}ms")]
    ConnectTimeout { url: String, timeout_ms: u64 },

    /// Transport-level error after the connection was established.
    #[error("transport error on '{url}': {reason}")]
    Transport { url: String, reason: String },

    /// Map metadata could not be fetched. Non-fatal to the session.
    #[error("failed to load map data for '{map}': {reason}")]
    AssetFetch { map: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel closed unexpectedly.
    #[error("channel closed unexpectedly")]
    ChannelClosed,
}

impl Error {
    /// True for the failures that surface to the user (configuration and
    /// transport); everything else degrades gracefully.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Error::PrivateAddress { .. }
                | Error::ConnectFailed { .. }
                | Error::Transport { .. }
        )
    }

    /// True when the session ended because the connection attempt timed
    /// out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::ConnectTimeout { .. })
    }
}

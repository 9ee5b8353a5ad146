//! Crate-level error types.
//!
//! [`OfsError`] unifies every error source (configuration, WebSocket,
//! JSON, frame shape, terminal I/O) behind a single enum so callers can
//! match on the variant they care about while still using the `?`
//! operator for easy propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OfsError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum OfsError {
    /// An environment variable was present but invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A WebSocket operation (connect, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A frame was valid JSON but did not carry a recognizable snapshot.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Terminal or file I/O failed.
    #[error("io error: {0}")]
    Io(String),
}

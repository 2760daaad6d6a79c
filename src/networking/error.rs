//! Error types for the networking layer

use crate::game::error::ProtocolError;

/// Errors that can occur while talking to the game server
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// WebSocket transport failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] websocket::Error),

    /// Server URL is not a valid request URI
    #[error("Invalid server URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// Frame could not be encoded or decoded
    #[error("Frame serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authoritative data failed validation
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Server closed the connection
    #[error("Connection closed by server")]
    ConnectionClosed,
}

/// Result type alias for networking operations
pub type NetworkResult<T> = Result<T, NetworkError>;

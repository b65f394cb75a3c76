//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The WebSocket connection could not be opened
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An established connection was closed by the server or the network
    #[error("Connection lost")]
    ConnectionLost,

    /// The history endpoint could not be reached or returned garbage
    #[error("Failed to fetch history: {0}")]
    HistoryError(String),

    /// Reconnection attempts are exhausted
    #[error("Failed to reconnect after {0} attempts")]
    ReconnectExhausted(u32),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::HistoryError(e.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::ConnectionError(e.to_string())
    }
}

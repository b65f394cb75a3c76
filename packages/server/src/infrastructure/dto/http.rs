//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

pub use super::websocket::MessageDto;

/// Query parameters for `GET /messages`
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Error body returned by HTTP endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
}

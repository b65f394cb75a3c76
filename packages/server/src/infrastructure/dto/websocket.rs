//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_NICKNAME;

fn default_nickname() -> String {
    DEFAULT_NICKNAME.to_string()
}

/// Client → server frame.
///
/// Both fields are optional on the wire; validation happens when the frame
/// is converted into a domain `NewMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default = "default_nickname")]
    pub nickname: String,
    #[serde(default)]
    pub content: String,
}

/// Wire representation of a stored message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: i64,
    pub nickname: String,
    pub content: String,
    /// RFC 3339 timestamp in UTC
    pub created_at: String,
}

/// Server → client frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    Message { message: MessageDto },
    UsersCount { count: usize },
}

//! Conversion logic between DTOs and domain entities.

use hiroba_shared::time::to_rfc3339_millis;

use crate::domain::{
    Message, MessageContent, NewMessage, Nickname, ServerEvent, ValueObjectError,
};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<dto::InboundMessage> for NewMessage {
    type Error = ValueObjectError;

    fn try_from(dto: dto::InboundMessage) -> Result<Self, Self::Error> {
        Ok(Self::new(
            Nickname::new(&dto.nickname)?,
            MessageContent::new(&dto.content)?,
        ))
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Message> for dto::MessageDto {
    fn from(model: &Message) -> Self {
        Self {
            id: model.id.value(),
            nickname: model.nickname.as_str().to_string(),
            content: model.content.as_str().to_string(),
            created_at: to_rfc3339_millis(&model.created_at),
        }
    }
}

impl From<&ServerEvent> for dto::OutboundEvent {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::MessagePosted(message) => Self::Message {
                message: message.into(),
            },
            ServerEvent::ConnectionCountChanged(count) => Self::UsersCount { count: *count },
        }
    }
}

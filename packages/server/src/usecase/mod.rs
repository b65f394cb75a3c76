//! UseCase 層
//!
//! ドメイン層の trait（MessageRepository / MessagePusher）を組み合わせて、
//! チャットリレーの各操作を実現します。

mod connect_participant;
mod disconnect_participant;
mod error;
mod get_recent_messages;
mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{GetRecentMessagesError, SendMessageError};
pub use get_recent_messages::{GetRecentMessagesUseCase, MAX_HISTORY_LIMIT};
pub use send_message::SendMessageUseCase;

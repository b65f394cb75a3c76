//! ドメイン層
//!
//! DTO やインフラストラクチャに依存しない、チャットリレーのビジネスルールを定義します。

pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Message, NewMessage};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use event::ServerEvent;
pub use message_pusher::{
    BroadcastReport, MessagePusher, PUSHER_CHANNEL_CAPACITY, PusherChannel, PusherReceiver,
    pusher_channel,
};
pub use repository::MessageRepository;
pub use value_object::{ConnectionId, DEFAULT_NICKNAME, MessageContent, MessageId, Nickname};

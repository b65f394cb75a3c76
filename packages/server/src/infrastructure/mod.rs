//! Infrastructure layer: DTOs, message stores and the WebSocket pusher.

pub mod dto;
pub mod message_pusher;
pub mod repository;

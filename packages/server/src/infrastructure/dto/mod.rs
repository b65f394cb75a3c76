//! Data Transfer Objects (DTOs) for external communication.
//!
//! This module contains DTOs used for serialization/deserialization
//! of WebSocket frames and HTTP responses.

pub mod http;
pub mod websocket;

mod conversion;

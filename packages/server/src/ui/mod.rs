//! HTTP / WebSocket front of the chat relay.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;

//! Real-time chat relay library.
//!
//! This library provides the server side of Hiroba: a WebSocket relay that
//! persists every accepted message and broadcasts it, together with the live
//! participant count, to all connected clients.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

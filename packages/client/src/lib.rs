//! Terminal chat client for the Hiroba relay.
//!
//! On every (re)connect the client prints the recent history fetched over
//! HTTP, then shows live messages and the online count while sending each
//! line typed at the prompt.

mod domain;
pub mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::run_client;

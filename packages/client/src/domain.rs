//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use crate::error::ClientError;

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `current_attempt` - Failed attempts so far since the last live session
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(current_attempt: u32, max_attempts: u32) -> bool {
    current_attempt < max_attempts
}

/// Compute the failed-attempt counter after a session ended with `error`.
///
/// A session that was established and later dropped starts a fresh series of
/// attempts; a failed connection attempt adds to the current series.
pub fn next_attempt(error: &ClientError, current_attempt: u32) -> u32 {
    match error {
        ClientError::ConnectionLost => 1,
        _ => current_attempt + 1,
    }
}

/// Build the history endpoint URL from the API base URL
pub fn history_url(api_url: &str) -> String {
    format!("{}/messages", api_url.trim_end_matches('/'))
}

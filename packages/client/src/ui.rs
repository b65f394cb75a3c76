//! UI utilities for the client.

use std::io::Write;

/// Prompt shown by the line editor
pub fn prompt(nickname: &str) -> String {
    format!("{}> ", nickname)
}

/// Redisplay the prompt after printing an incoming event
pub fn redisplay_prompt(nickname: &str) {
    print!("{}", prompt(nickname));
    std::io::stdout().flush().ok();
}

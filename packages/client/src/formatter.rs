//! Message formatting utilities for client display.

use chrono::{DateTime, Utc};
use hiroba_server::infrastructure::dto::websocket::MessageDto;
use hiroba_shared::time::to_local_clock_time;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the history block printed right after connecting
    pub fn format_history(messages: &[MessageDto]) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        output.push_str("Recent messages:\n");

        if messages.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for message in messages {
                output.push_str(&Self::format_message_line(message));
                output.push('\n');
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a live chat message
    pub fn format_chat_message(message: &MessageDto) -> String {
        format!("\n{}\n", Self::format_message_line(message))
    }

    /// Format the online-count notification
    pub fn format_users_count(count: usize) -> String {
        format!("\n* {} online\n", count)
    }

    /// Format a raw text frame (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    /// `[HH:MM:SS] nickname: content`, falling back to the raw timestamp
    fn format_message_line(message: &MessageDto) -> String {
        let time = DateTime::parse_from_rfc3339(&message.created_at)
            .map(|t| to_local_clock_time(&t.with_timezone(&Utc)))
            .unwrap_or_else(|_| message.created_at.clone());
        format!("[{}] {}: {}", time, message.nickname, message.content)
    }
}

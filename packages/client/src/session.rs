//! WebSocket client session management.

use futures_util::{Sink, SinkExt, StreamExt};
use hiroba_server::infrastructure::dto::websocket::{InboundMessage, MessageDto, OutboundEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{domain::history_url, error::ClientError};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// Fetch the recent history from the HTTP API, oldest first
async fn fetch_history(api_url: &str) -> Result<Vec<MessageDto>, ClientError> {
    let messages = reqwest::get(history_url(api_url))
        .await?
        .error_for_status()?
        .json::<Vec<MessageDto>>()
        .await?;
    Ok(messages)
}

/// Print one server frame
fn display_frame(text: &str, nickname: &str) {
    let formatted = match serde_json::from_str::<OutboundEvent>(text) {
        Ok(OutboundEvent::Message { message }) => MessageFormatter::format_chat_message(&message),
        Ok(OutboundEvent::UsersCount { count }) => MessageFormatter::format_users_count(count),
        Err(_) => MessageFormatter::format_raw_message(text),
    };
    print!("{}", formatted);
    redisplay_prompt(nickname);
}

/// Forward typed lines to the server until the input ends or the socket fails.
///
/// Returns `Ok(())` when the user closed the input.
async fn write_loop<W>(
    write: &mut W,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    nickname: &str,
) -> Result<(), ClientError>
where
    W: Sink<Message> + Unpin,
    W::Error: std::fmt::Display,
{
    while let Some(line) = input_rx.recv().await {
        let msg = InboundMessage {
            nickname: nickname.to_string(),
            content: line,
        };

        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize message: {}", e);
                continue;
            }
        };

        if let Err(e) = write.send(Message::Text(json.into())).await {
            tracing::warn!("Failed to send message: {}", e);
            return Err(ClientError::ConnectionLost);
        }
    }

    Ok(())
}

/// Run one WebSocket client session
///
/// Returns `Ok(())` when the user ends the session, and an error when the
/// connection could not be opened or was lost.
pub async fn run_client_session(
    url: &str,
    api_url: &str,
    nickname: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    // History is best effort: the live feed still works without it
    match fetch_history(api_url).await {
        Ok(messages) => print!("{}", MessageFormatter::format_history(&messages)),
        Err(e) => tracing::warn!("{}", e),
    }

    let (ws_stream, _) = connect_async(url).await?;

    tracing::info!("Connected to chat server!");
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        nickname
    );
    redisplay_prompt(nickname);

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming frames
    let nickname_for_read = nickname.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => display_frame(text.as_str(), &nickname_for_read),
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // If either side completes, stop the other
    tokio::select! {
        _ = &mut read_task => Err(ClientError::ConnectionLost),
        result = write_loop(&mut write, input_rx, nickname) => {
            read_task.abort();
            if result.is_ok() {
                write.close().await.ok();
            }
            result
        }
    }
}

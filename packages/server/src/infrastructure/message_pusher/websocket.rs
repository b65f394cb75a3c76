//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - ライブセット（接続 ID → 送信キュー）の排他的な管理
//! - イベントの JSON エンコードと全接続へのファンアウト
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! UI 層は接続ごとに送信キューを作成し、受信側を writer タスクに渡し、
//! 送信側をこの実装に登録します。
//!
//! 配信は `try_send` で行うため、ロックを保持したまま全接続に配信しても
//! 遅いクライアントに引きずられることはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::{
    domain::{
        BroadcastReport, ConnectionId, MessagePushError, MessagePusher, PusherChannel,
        ServerEvent,
    },
    infrastructure::dto::websocket::OutboundEvent,
};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信キュー
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }
}

/// イベントを JSON 文字列にエンコード
fn encode(event: &ServerEvent) -> Result<String, MessagePushError> {
    serde_json::to_string(&OutboundEvent::from(event))
        .map_err(|e| MessagePushError::Encode(e.to_string()))
}

/// 1 接続への配信を試みる（ブロックしない）
fn push(
    connection_id: &ConnectionId,
    sender: &PusherChannel,
    frame: &str,
) -> Result<(), MessagePushError> {
    sender.try_send(frame.to_string()).map_err(|e| match e {
        TrySendError::Full(_) => MessagePushError::QueueFull(connection_id.to_string()),
        TrySendError::Closed(_) => MessagePushError::ChannelClosed(connection_id.to_string()),
    })
}

/// 全接続への配信。個々の失敗は記録して握りつぶす
fn fan_out(clients: &HashMap<ConnectionId, PusherChannel>, frame: &str) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    for (connection_id, sender) in clients.iter() {
        match push(connection_id, sender, frame) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!("Failed to push event: {}", e);
                report.failed += 1;
            }
        }
    }

    report
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) -> usize {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        clients.len()
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) -> bool {
        let mut clients = self.clients.lock().await;
        let removed = clients.remove(connection_id).is_some();
        if removed {
            tracing::debug!(
                "Connection '{}' unregistered from MessagePusher",
                connection_id
            );
        }
        removed
    }

    async fn broadcast(&self, event: &ServerEvent) -> Result<BroadcastReport, MessagePushError> {
        let frame = encode(event)?;
        let clients = self.clients.lock().await;
        Ok(fan_out(&clients, &frame))
    }

    async fn broadcast_connection_count(&self) -> Result<BroadcastReport, MessagePushError> {
        let clients = self.clients.lock().await;
        let frame = encode(&ServerEvent::ConnectionCountChanged(clients.len()))?;
        Ok(fan_out(&clients, &frame))
    }

    async fn connection_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - ライブセットへの登録と、接続数の通知
//!
//! ### なぜこのテストが必要か
//! - 新規接続を含む全接続に最新の接続数が通知されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：最初の参加者の接続
//! - 正常系：既存の参加者がいる状態での接続

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// MessagePusher（ライブセットとイベント配信の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 参加者接続を実行
    ///
    /// WebSocket のハンドシェイク完了後に呼び出す。登録は常に成功する。
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 接続 ID（Domain Model）
    /// * `sender` - クライアントへのメッセージ送信用キュー
    ///
    /// # Returns
    ///
    /// 全接続に通知した接続数
    pub async fn execute(&self, connection_id: ConnectionId, sender: PusherChannel) -> usize {
        // 1. ライブセットに登録
        let count = self
            .message_pusher
            .register_client(connection_id, sender)
            .await;

        // 2. 新規接続を含む全接続に接続数を通知し、通知した値を返す
        match self.message_pusher.broadcast_connection_count().await {
            Ok(report) => {
                tracing::debug!(
                    "Announced connection count after '{}' joined ({} delivered, {} failed)",
                    connection_id,
                    report.delivered,
                    report.failed
                );
                report.recipients()
            }
            Err(e) => {
                tracing::warn!("Failed to announce connection count: {}", e);
                count
            }
        }
    }
}

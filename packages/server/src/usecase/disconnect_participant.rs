//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - ライブセットからの削除と、残りの参加者への接続数の通知
//!
//! ### なぜこのテストが必要か
//! - 切断時に残りの参加者へ減少後の接続数がちょうど 1 回通知されることを保証
//! - 同じ接続の 2 回目の切断が何もしない（冪等）ことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 人中 1 人の切断
//! - エッジケース：最後の参加者の切断（通知対象なし）
//! - エッジケース：存在しない接続の切断

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// MessagePusher（ライブセットとイベント配信の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 参加者切断を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 切断する接続の ID（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Some(usize)` - 残りの参加者に通知した削除後の接続数
    /// * `None` - 接続がライブセットに存在しなかった（何もしない）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<usize> {
        // 1. ライブセットから削除（存在しなければ何もしない）
        if !self.message_pusher.unregister_client(connection_id).await {
            return None;
        }

        // 2. 残りの参加者に接続数を通知し、通知した値を返す
        match self.message_pusher.broadcast_connection_count().await {
            Ok(report) => {
                tracing::debug!(
                    "Announced connection count after '{}' left ({} delivered, {} failed)",
                    connection_id,
                    report.delivered,
                    report.failed
                );
                Some(report.recipients())
            }
            Err(e) => {
                tracing::warn!("Failed to announce connection count: {}", e);
                Some(self.message_pusher.connection_count().await)
            }
        }
    }
}

//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの保存と、保存済みレコードの全接続へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 保存に成功したメッセージだけがブロードキャストされることを保証
//! - 送信者自身を含む全接続に配信されることを確認
//! - 保存失敗時にブロードキャストが行われないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存とブロードキャスト
//! - 異常系：メッセージストアの障害
//! - エッジケース：接続が 1 つも無い状態での送信

use std::sync::Arc;

use crate::domain::{Message, MessagePusher, MessageRepository, NewMessage, ServerEvent};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（メッセージストアの抽象化）
    repository: Arc<dyn MessageRepository>,
    /// MessagePusher（ライブセットとイベント配信の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `message` - 検証済みのメッセージ（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 保存されたメッセージ（ID・作成日時付き）
    /// * `Err(SendMessageError)` - 保存失敗（ブロードキャストは行われない）
    pub async fn execute(&self, message: NewMessage) -> Result<Message, SendMessageError> {
        // 1. Repository 経由でメッセージを保存
        let stored = self.repository.insert(message).await?;

        // 2. 保存済みレコードを全接続にブロードキャスト（配信失敗は呼び出し元に伝播しない）
        match self
            .message_pusher
            .broadcast(&ServerEvent::MessagePosted(stored.clone()))
            .await
        {
            Ok(report) => tracing::debug!(
                "Broadcasted message {} ({} delivered, {} failed)",
                stored.id.value(),
                report.delivered,
                report.failed
            ),
            Err(e) => tracing::warn!(
                "Failed to broadcast message {}: {}",
                stored.id.value(),
                e
            ),
        }

        Ok(stored)
    }
}

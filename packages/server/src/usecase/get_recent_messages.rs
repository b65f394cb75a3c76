//! UseCase: 最新メッセージ（履歴）取得処理
//!
//! 初回ページ読み込み用に、最新のメッセージを古い順で返します。

use std::sync::Arc;

use crate::domain::{Message, MessageRepository};

use super::error::GetRecentMessagesError;

/// 履歴取得件数のデフォルト値かつ上限
pub const MAX_HISTORY_LIMIT: usize = 50;

/// 最新メッセージ取得のユースケース
pub struct GetRecentMessagesUseCase {
    /// Repository（メッセージストアの抽象化）
    repository: Arc<dyn MessageRepository>,
}

impl GetRecentMessagesUseCase {
    /// 新しい GetRecentMessagesUseCase を作成
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// 最新メッセージ取得を実行
    ///
    /// # Arguments
    ///
    /// * `limit` - 取得件数。省略時は 50、50 を超える値は 50 に切り詰める
    pub async fn execute(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, GetRecentMessagesError> {
        let limit = limit.unwrap_or(MAX_HISTORY_LIMIT).min(MAX_HISTORY_LIMIT);
        Ok(self.repository.fetch_recent(limit).await?)
    }
}

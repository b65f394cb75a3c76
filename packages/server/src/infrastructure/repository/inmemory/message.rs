//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! Vec を追記専用のインメモリ DB として使用します。
//! プロセスが終了するとメッセージは失われます。

use std::sync::Arc;

use async_trait::async_trait;
use hiroba_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{Message, MessageId, MessageRepository, NewMessage, RepositoryError};

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    /// 保存済みメッセージ（ID 昇順）
    messages: Mutex<Vec<Message>>,
    /// 作成日時の採番に使う時計
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// 保存済みメッセージ数
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let mut messages = self.messages.lock().await;

        // 削除経路が存在しないため、件数 + 1 は単調増加する
        let id = MessageId::new(messages.len() as i64 + 1);
        let stored = Message {
            id,
            nickname: message.nickname,
            content: message.content,
            created_at: self.clock.now(),
        };
        messages.push(stored.clone());

        Ok(stored)
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageContent, Nickname};
    use hiroba_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryMessageRepository の insert / fetch_recent
    //
    // 【なぜこのテストが必要か】
    // - UseCase 層のテストはこの実装に依存している
    // - ID の単調増加と、古い順での取得を保証する必要がある
    //
    // 【どのようなシナリオをテストするか】
    // 1. insert で ID と作成日時が割り当てられる
    // 2. fetch_recent が最新 N 件を古い順に返す
    // 3. limit が保存件数より大きい場合・0 の場合
    // ========================================

    fn new_message(nickname: &str, content: &str) -> NewMessage {
        NewMessage::new(
            Nickname::new(nickname).unwrap(),
            MessageContent::new(content).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        // テスト項目: insert で ID と作成日時が割り当てられる
        // given (前提条件):
        let repo = InMemoryMessageRepository::new(Arc::new(FixedClock::new(1672531200000)));

        // when (操作):
        let first = repo.insert(new_message("alice", "hi")).await.unwrap();
        let second = repo.insert(new_message("bob", "yo")).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.id, MessageId::new(1));
        assert_eq!(second.id, MessageId::new(2));
        assert_eq!(first.created_at.timestamp_millis(), 1672531200000);
        assert_eq!(first.nickname.as_str(), "alice");
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_fetch_recent_returns_latest_in_chronological_order() {
        // テスト項目: 最新 N 件が古い順に返される
        // given (前提条件):
        let repo = InMemoryMessageRepository::default();
        for i in 1..=5 {
            repo.insert(new_message("alice", &format!("message {}", i)))
                .await
                .unwrap();
        }

        // when (操作):
        let result = repo.fetch_recent(3).await.unwrap();

        // then (期待する結果):
        let contents: Vec<&str> = result.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 3", "message 4", "message 5"]);
        assert!(result.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_fetch_recent_with_large_limit() {
        // テスト項目: limit が保存件数より大きい場合は全件が返される
        // given (前提条件):
        let repo = InMemoryMessageRepository::default();
        repo.insert(new_message("alice", "hi")).await.unwrap();

        // when (操作):
        let result = repo.fetch_recent(50).await.unwrap();

        // then (期待する結果):
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_recent_with_zero_limit() {
        // テスト項目: limit が 0 の場合は空のリストが返される
        // given (前提条件):
        let repo = InMemoryMessageRepository::default();
        repo.insert(new_message("alice", "hi")).await.unwrap();

        // when (操作):
        let result = repo.fetch_recent(0).await.unwrap();

        // then (期待する結果):
        assert!(result.is_empty());
    }
}

//! ドメインエンティティ

use chrono::{DateTime, Utc};

use super::value_object::{MessageContent, MessageId, Nickname};

/// 検証済みで、まだ保存されていないメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub nickname: Nickname,
    pub content: MessageContent,
}

impl NewMessage {
    /// 検証済みのニックネームと本文から作成
    pub fn new(nickname: Nickname, content: MessageContent) -> Self {
        Self { nickname, content }
    }
}

/// 保存済みのメッセージ
///
/// 受け付けた受信ペイロード 1 件につきちょうど 1 回作成され、以後変更されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// ストアが採番した ID（単調増加）
    pub id: MessageId,
    pub nickname: Nickname,
    pub content: MessageContent,
    /// 作成日時（UTC）
    pub created_at: DateTime<Utc>,
}

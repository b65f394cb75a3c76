//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("nickname must not be empty")]
    EmptyNickname,

    #[error("message content must not be empty")]
    EmptyContent,
}

/// メッセージストアのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// ストアに接続できない、またはクエリが失敗した
    #[error("storage error: {0}")]
    Storage(String),

    /// 保存済みの行をメッセージに復元できない
    #[error("corrupted record: {0}")]
    CorruptedRecord(String),

    /// 対応していないスキームのデータベース URL
    #[error("unsupported database URL scheme: '{0}'")]
    UnsupportedDatabaseUrl(String),
}

/// 接続へのイベント配信時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is closed")]
    ChannelClosed(String),

    #[error("outbound queue of connection '{0}' is full")]
    QueueFull(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}

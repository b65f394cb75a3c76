//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RepositoryError;

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// メッセージの保存に失敗（ブロードキャストは行われない）
    #[error("failed to persist message: {0}")]
    Persistence(#[from] RepositoryError),
}

/// 履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRecentMessagesError {
    #[error("failed to fetch messages: {0}")]
    Repository(#[from] RepositoryError),
}

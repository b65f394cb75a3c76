//! Repository trait 定義
//!
//! ドメイン層が必要とするメッセージストアのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Message, NewMessage, RepositoryError};

/// Message Repository trait
///
/// 追記専用のメッセージストア。UseCase 層はこの trait に依存し、
/// Infrastructure 層の具体的な実装（InMemory / SQLite / PostgreSQL）には依存しない。
///
/// 実装は複数の接続からの同時 insert / 読み出しに対して安全でなければならない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを保存し、ID と作成日時が割り当てられたレコードを返す
    async fn insert(&self, message: NewMessage) -> Result<Message, RepositoryError>;

    /// 最新 `limit` 件のメッセージを古い順に取得
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Message>, RepositoryError>;
}

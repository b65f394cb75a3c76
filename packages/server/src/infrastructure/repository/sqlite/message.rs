//! SQLite Message Repository 実装
//!
//! sqlx の SQLite ドライバを使った MessageRepository 実装。
//! 起動時に `messages` テーブルが存在しなければ作成します。

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hiroba_shared::time::{Clock, SystemClock};
use sqlx::{
    Row,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
};

use crate::domain::{
    Message, MessageContent, MessageId, MessageRepository, NewMessage, Nickname, RepositoryError,
};

const MAX_CONNECTIONS: u32 = 5;

const CREATE_MESSAGES_TABLE: &str = "CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

const CREATE_NICKNAME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ix_messages_nickname ON messages (nickname)";

/// SQLite Message Repository 実装
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteMessageRepository {
    /// 既存のプールから作成（テーブル作成は行わない）
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// データベースに接続し、テーブルを作成した状態の Repository を返す
    ///
    /// # Arguments
    ///
    /// * `database_url` - 例: `sqlite://chat.db`, `sqlite::memory:`
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // インメモリ DB は接続ごとに別の DB になるため、単一の接続を保持し続ける
        let pool = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect_with(options)
                .await?
        };

        tracing::info!("Connected to message store at {}", database_url);

        let repository = Self::new(pool, Arc::new(SystemClock));
        repository.create_table().await?;
        Ok(repository)
    }

    /// `messages` テーブルとインデックスを作成（存在する場合は何もしない）
    pub async fn create_table(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_MESSAGES_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_NICKNAME_INDEX)
            .execute(&self.pool)
            .await?;
        tracing::debug!("Ensured messages table exists");
        Ok(())
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn row_to_message(row: &SqliteRow) -> Result<Message, RepositoryError> {
    let id: i64 = row.try_get("id")?;
    let nickname: String = row.try_get("nickname")?;
    let content: String = row.try_get("content")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Message {
        id: MessageId::new(id),
        nickname: Nickname::new(&nickname)
            .map_err(|e| RepositoryError::CorruptedRecord(format!("message {}: {}", id, e)))?,
        content: MessageContent::new(&content)
            .map_err(|e| RepositoryError::CorruptedRecord(format!("message {}: {}", id, e)))?,
        created_at,
    })
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn insert(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let created_at = self.clock.now();

        let result =
            sqlx::query("INSERT INTO messages (nickname, content, created_at) VALUES (?, ?, ?)")
                .bind(message.nickname.as_str())
                .bind(message.content.as_str())
                .bind(created_at)
                .execute(&self.pool)
                .await?;

        Ok(Message {
            id: MessageId::new(result.last_insert_rowid()),
            nickname: message.nickname,
            content: message.content,
            created_at,
        })
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Message>, RepositoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // 最新 N 件を降順で取得してから、古い順に並べ替える
        let rows = sqlx::query(
            "SELECT id, nickname, content, created_at
             FROM messages
             ORDER BY id DESC
             LIMIT ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let mut messages = rows
            .iter()
            .map(row_to_message)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();

        Ok(messages)
    }
}

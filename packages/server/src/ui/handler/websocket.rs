//! WebSocket connection handlers.
//!
//! Each upgraded connection runs two tasks:
//!
//! - the ingestion loop, which reads one inbound frame at a time, validates it,
//!   stores it and hands the stored record to the broadcaster
//! - the pusher loop, which drains the connection's outbound queue into the socket
//!
//! Whichever task finishes first aborts the other, and the connection is then
//! deregistered exactly once.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{Stream, sink::SinkExt, stream::StreamExt};
use tokio::sync::oneshot;

use crate::{
    domain::{ConnectionId, NewMessage, PusherReceiver, pusher_channel},
    infrastructure::dto::websocket::InboundMessage,
    ui::state::AppState,
    usecase::SendMessageUseCase,
};

/// Why a connection's ingestion loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client sent a close frame or the stream ended
    ClientClosed,
    /// Reading from the socket failed
    TransportError,
    /// The message store failed while processing a frame
    PersistenceFailure,
    /// Writing to the socket failed
    WriterClosed,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx queue and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Outbound queue filled by the broadcaster
/// * `sender` - WebSocket sink to send frames to this client
fn pusher_loop(
    mut rx: PusherReceiver,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Decode a text frame into a validated message.
///
/// Returns `None` for malformed JSON and for payloads whose trimmed nickname
/// or content is empty. Such frames are dropped without any reply.
fn decode_inbound(text: &str) -> Option<NewMessage> {
    let inbound: InboundMessage = serde_json::from_str(text).ok()?;
    NewMessage::try_from(inbound).ok()
}

/// Process inbound frames of one connection strictly in arrival order.
///
/// `writer_closed` only interrupts the wait for the next frame. A frame that
/// is already being processed is stored and broadcast before the loop exits.
pub(crate) async fn ingestion_loop<S>(
    mut receiver: S,
    send_message_usecase: &SendMessageUseCase,
    connection_id: ConnectionId,
    mut writer_closed: oneshot::Receiver<()>,
) -> CloseReason
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let frame = tokio::select! {
            biased;
            _ = &mut writer_closed => return CloseReason::WriterClosed,
            frame = receiver.next() => frame,
        };
        let Some(frame) = frame else {
            break;
        };

        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("WebSocket error on connection '{}': {}", connection_id, e);
                return CloseReason::TransportError;
            }
        };

        match frame {
            Message::Text(text) => {
                let Some(message) = decode_inbound(text.as_str()) else {
                    continue;
                };

                match send_message_usecase.execute(message).await {
                    Ok(stored) => tracing::debug!(
                        "Connection '{}' posted message {}",
                        connection_id,
                        stored.id.value()
                    ),
                    Err(e) => {
                        tracing::error!(
                            "Closing connection '{}' after store failure: {}",
                            connection_id,
                            e
                        );
                        return CloseReason::PersistenceFailure;
                    }
                }
            }
            Message::Close(_) => {
                tracing::debug!("Connection '{}' requested close", connection_id);
                return CloseReason::ClientClosed;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            _ => {}
        }
    }

    CloseReason::ClientClosed
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (sender, receiver) = socket.split();
    let (tx, rx) = pusher_channel();

    // Handshake is complete: join the live set and announce the new count
    let count = state
        .connect_participant_usecase
        .execute(connection_id, tx)
        .await;
    tracing::info!(
        "Connection '{}' registered ({} connected)",
        connection_id,
        count
    );

    let mut send_task = pusher_loop(rx, sender);

    let (writer_closed_tx, writer_closed_rx) = oneshot::channel();
    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        ingestion_loop(
            receiver,
            &state_clone.send_message_usecase,
            connection_id,
            writer_closed_rx,
        )
        .await
    });

    // The writer is aborted as soon as the reader stops. The reader is only
    // signalled, so a frame in flight still gets stored and broadcast.
    let reason = tokio::select! {
        result = &mut recv_task => {
            send_task.abort();
            result.unwrap_or(CloseReason::TransportError)
        }
        _ = &mut send_task => {
            writer_closed_tx.send(()).ok();
            recv_task.await.unwrap_or(CloseReason::TransportError)
        }
    };

    match state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await
    {
        Some(remaining) => tracing::info!(
            "Connection '{}' closed ({:?}), {} connected",
            connection_id,
            reason,
            remaining
        ),
        None => tracing::debug!(
            "Connection '{}' was already removed from the live set",
            connection_id
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Message as StoredMessage, MessagePusher, MessageRepository, RepositoryError,
            repository::MockMessageRepository,
        },
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryMessageRepository,
        },
    };
    use async_trait::async_trait;
    use futures_util::stream;
    use tokio::sync::Notify;

    /// insert の途中で止まり、合図があるまで保存を完了しない Repository
    struct GatedMessageRepository {
        inner: InMemoryMessageRepository,
        insert_started: Notify,
        release_insert: Notify,
    }

    #[async_trait]
    impl MessageRepository for GatedMessageRepository {
        async fn insert(&self, message: NewMessage) -> Result<StoredMessage, RepositoryError> {
            self.insert_started.notify_one();
            self.release_insert.notified().await;
            self.inner.insert(message).await
        }

        async fn fetch_recent(&self, limit: usize) -> Result<Vec<StoredMessage>, RepositoryError> {
            self.inner.fetch_recent(limit).await
        }
    }

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ingestion_loop: 受信フレームの検証・保存・ブロードキャスト
    //
    // 【なぜこのテストが必要か】
    // - 不正なフレームが接続を切らずに黙って破棄されることを保証
    // - 有効なフレームだけが保存・配信されることを保証
    // - ストア障害時に接続が閉じられることを保証
    //
    // 【どのようなシナリオをテストするか】
    // 1. 不正な JSON・空白のみのフィールドの破棄
    // 2. デフォルトのニックネーム
    // 3. close フレーム以降のフレームは処理されない
    // 4. ストア障害・トランスポートエラー
    // 5. 書き込み側の終了（処理中のフレームは保存・配信まで完了する）
    // ========================================

    fn text(payload: &str) -> Result<Message, axum::Error> {
        Ok(Message::Text(payload.into()))
    }

    async fn create_test_usecase() -> (
        SendMessageUseCase,
        Arc<InMemoryMessageRepository>,
        PusherReceiver,
    ) {
        let repository = Arc::new(InMemoryMessageRepository::default());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let (tx, rx) = pusher_channel();
        pusher.register_client(ConnectionId::generate(), tx).await;
        let usecase = SendMessageUseCase::new(repository.clone(), pusher);
        (usecase, repository, rx)
    }

    #[test]
    fn test_decode_inbound_valid_payload() {
        // テスト項目: 有効なペイロードが前後の空白を除去したメッセージに変換される
        // given (前提条件):
        let payload = r#"{"nickname":" alice ","content":" hi "}"#;

        // when (操作):
        let result = decode_inbound(payload).unwrap();

        // then (期待する結果):
        assert_eq!(result.nickname.as_str(), "alice");
        assert_eq!(result.content.as_str(), "hi");
    }

    #[test]
    fn test_decode_inbound_defaults_nickname() {
        // テスト項目: ニックネームが省略された場合は "Anonymous" になる
        // given (前提条件):
        let payload = r#"{"content":"hi"}"#;

        // when (操作):
        let result = decode_inbound(payload).unwrap();

        // then (期待する結果):
        assert_eq!(result.nickname.as_str(), "Anonymous");
    }

    #[test]
    fn test_decode_inbound_drops_invalid_payloads() {
        // テスト項目: 不正な JSON や空のフィールドを含むペイロードは破棄される
        // given (前提条件):
        let payloads = [
            "not json",
            r#"{"nickname":"  ","content":"hello"}"#,
            r#"{"nickname":"alice","content":"   "}"#,
            r#"{"nickname":"alice"}"#,
            r#"{"nickname":null,"content":"hi"}"#,
            r#"{"nickname":1,"content":"hi"}"#,
            "42",
        ];

        // when (操作) / then (期待する結果):
        for payload in payloads {
            assert!(decode_inbound(payload).is_none(), "payload: {}", payload);
        }
    }

    #[tokio::test]
    async fn test_ingestion_loop_stores_only_valid_frames() {
        // テスト項目: 不正なフレームは接続を切らずに破棄され、有効なフレームのみ保存・配信される
        // given (前提条件):
        let (usecase, repository, mut rx) = create_test_usecase().await;
        let frames = stream::iter(vec![
            text("{broken"),
            text(r#"{"nickname":"  ","content":"hello"}"#),
            text(r#"{"nickname":"alice","content":"hi"}"#),
            Ok(Message::Binary(vec![1u8, 2, 3].into())),
            Ok(Message::Ping(Default::default())),
            text(r#"{"content":"anyone?"}"#),
        ]);
        let (_writer_open, writer_closed) = oneshot::channel();

        // when (操作):
        let reason =
            ingestion_loop(frames, &usecase, ConnectionId::generate(), writer_closed).await;

        // then (期待する結果):
        assert_eq!(reason, CloseReason::ClientClosed);
        assert_eq!(repository.len().await, 2);

        let first: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        let second: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(first["message"]["nickname"], "alice");
        assert_eq!(first["message"]["content"], "hi");
        assert_eq!(second["message"]["nickname"], "Anonymous");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_ingestion_loop_stops_at_close_frame() {
        // テスト項目: close フレーム以降のフレームは処理されない
        // given (前提条件):
        let (usecase, repository, _rx) = create_test_usecase().await;
        let frames = stream::iter(vec![
            text(r#"{"nickname":"alice","content":"first"}"#),
            Ok(Message::Close(None)),
            text(r#"{"nickname":"alice","content":"after close"}"#),
        ]);
        let (_writer_open, writer_closed) = oneshot::channel();

        // when (操作):
        let reason =
            ingestion_loop(frames, &usecase, ConnectionId::generate(), writer_closed).await;

        // then (期待する結果):
        assert_eq!(reason, CloseReason::ClientClosed);
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_ingestion_loop_closes_on_store_failure() {
        // テスト項目: ストア障害時はループが停止し、後続のフレームは処理されない
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository
            .expect_insert()
            .times(1)
            .returning(|_| Err(RepositoryError::Storage("disk I/O error".to_string())));
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let (tx, mut rx) = pusher_channel();
        pusher.register_client(ConnectionId::generate(), tx).await;
        let usecase = SendMessageUseCase::new(Arc::new(repository), pusher);
        let frames = stream::iter(vec![
            text(r#"{"nickname":"alice","content":"first"}"#),
            text(r#"{"nickname":"alice","content":"second"}"#),
        ]);
        let (_writer_open, writer_closed) = oneshot::channel();

        // when (操作):
        let reason =
            ingestion_loop(frames, &usecase, ConnectionId::generate(), writer_closed).await;

        // then (期待する結果):
        assert_eq!(reason, CloseReason::PersistenceFailure);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_ingestion_loop_stops_on_transport_error() {
        // テスト項目: トランスポートエラーでループが停止する
        // given (前提条件):
        let (usecase, repository, _rx) = create_test_usecase().await;
        let frames = stream::iter(vec![
            Err(axum::Error::new(std::io::Error::other("connection reset"))),
            text(r#"{"nickname":"alice","content":"hi"}"#),
        ]);
        let (_writer_open, writer_closed) = oneshot::channel();

        // when (操作):
        let reason =
            ingestion_loop(frames, &usecase, ConnectionId::generate(), writer_closed).await;

        // then (期待する結果):
        assert_eq!(reason, CloseReason::TransportError);
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn test_ingestion_loop_stops_when_writer_closes_while_idle() {
        // テスト項目: フレーム待ちの間に書き込み側が終了すると、ループが停止する
        // given (前提条件):
        let (usecase, repository, _rx) = create_test_usecase().await;
        let frames = stream::pending::<Result<Message, axum::Error>>();
        let (writer_closed_tx, writer_closed) = oneshot::channel();

        // when (操作):
        writer_closed_tx.send(()).unwrap();
        let reason =
            ingestion_loop(frames, &usecase, ConnectionId::generate(), writer_closed).await;

        // then (期待する結果):
        assert_eq!(reason, CloseReason::WriterClosed);
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn test_ingestion_loop_finishes_frame_in_flight_when_writer_closes() {
        // テスト項目: 保存中に書き込み側が終了しても、そのフレームは保存・配信まで完了してから停止する
        // given (前提条件):
        let repository = Arc::new(GatedMessageRepository {
            inner: InMemoryMessageRepository::default(),
            insert_started: Notify::new(),
            release_insert: Notify::new(),
        });
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let (watcher_tx, mut watcher_rx) = pusher_channel();
        pusher
            .register_client(ConnectionId::generate(), watcher_tx)
            .await;
        let usecase = SendMessageUseCase::new(repository.clone(), pusher);
        let frames = stream::iter(vec![text(r#"{"nickname":"alice","content":"hi"}"#)])
            .chain(stream::pending());
        let (writer_closed_tx, writer_closed) = oneshot::channel();
        let ingestion = tokio::spawn(async move {
            ingestion_loop(frames, &usecase, ConnectionId::generate(), writer_closed).await
        });

        // when (操作):
        repository.insert_started.notified().await;
        writer_closed_tx.send(()).unwrap();
        repository.release_insert.notify_one();
        let reason = ingestion.await.unwrap();

        // then (期待する結果):
        assert_eq!(reason, CloseReason::WriterClosed);
        assert_eq!(repository.inner.len().await, 1);
        let event: serde_json::Value =
            serde_json::from_str(&watcher_rx.recv().await.unwrap()).unwrap();
        assert_eq!(event["type"], "message");
        assert_eq!(event["message"]["content"], "hi");
    }
}

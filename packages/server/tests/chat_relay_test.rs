//! End-to-end tests for the chat relay: real router, real sockets.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{
    domain::MessageRepository,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryMessageRepository, SqliteMessageRepository},
    },
    ui::Server,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRecentMessagesUseCase,
        SendMessageUseCase,
    },
};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

// ========================================
// テスト作業記録
// ========================================
// 【何をテストするか】
// - /ws/chat: 接続数の通知、メッセージの保存と全員への配信
// - /messages: 履歴の取得（古い順、件数制限）
// - /health: ヘルスチェック
//
// 【なぜこのテストが必要か】
// - 各層を組み合わせた状態で、実際のソケット越しに期待通り動くことを保証
//
// 【どのようなシナリオをテストするか】
// 1. alice の "hi" が送信者を含む全員に届き、履歴にも残る
// 2. 空白のみのニックネームは破棄され、接続は維持される
// 3. 切断すると残りのクライアントに減った接続数が通知される
// 4. 履歴の件数制限と並び順
// ========================================

/// Start the relay on an ephemeral port and return its address
async fn spawn_server(repository: Arc<dyn MessageRepository>) -> SocketAddr {
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let server = Server::new(
        Arc::new(ConnectParticipantUseCase::new(message_pusher.clone())),
        Arc::new(DisconnectParticipantUseCase::new(message_pusher.clone())),
        Arc::new(SendMessageUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        )),
        Arc::new(GetRecentMessagesUseCase::new(repository)),
        vec![],
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server.router()).await.unwrap();
    });
    addr
}

async fn spawn_in_memory_server() -> SocketAddr {
    spawn_server(Arc::new(InMemoryMessageRepository::default())).await
}

/// Connect and wait until the server has announced a count including us
async fn connect(addr: SocketAddr, expected_count: u64) -> WsStream {
    let (mut ws, _) = connect_async(format!("ws://{}/ws/chat", addr))
        .await
        .unwrap();
    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "users_count");
    assert_eq!(event["count"], expected_count);
    ws
}

/// Read the next text frame as JSON
async fn next_event(ws: &mut WsStream) -> Value {
    loop {
        let frame = tokio::time::timeout(FRAME_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("transport error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn send_json(ws: &mut WsStream, payload: &str) {
    ws.send(Message::Text(payload.into())).await.unwrap();
}

async fn get_json(url: String) -> Value {
    reqwest::get(url).await.unwrap().json().await.unwrap()
}

#[tokio::test]
async fn test_message_is_relayed_to_everyone_and_stored() {
    // テスト項目: alice の "hi" が送信者を含む全員に届き、履歴にも残る
    // given (前提条件):
    let addr = spawn_in_memory_server().await;
    let mut alice = connect(addr, 1).await;
    let mut bob = connect(addr, 2).await;
    assert_eq!(next_event(&mut alice).await["count"], 2);

    // when (操作):
    send_json(&mut alice, r#"{"nickname":"alice","content":"hi"}"#).await;

    // then (期待する結果):
    for ws in [&mut alice, &mut bob] {
        let event = next_event(ws).await;
        assert_eq!(event["type"], "message");
        assert_eq!(event["message"]["id"], 1);
        assert_eq!(event["message"]["nickname"], "alice");
        assert_eq!(event["message"]["content"], "hi");
        assert!(event["message"]["created_at"].is_string());
    }

    let history = get_json(format!("http://{}/messages", addr)).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["nickname"], "alice");
    assert_eq!(history[0]["content"], "hi");
}

#[tokio::test]
async fn test_whitespace_nickname_is_dropped_without_closing() {
    // テスト項目: 空白のみのニックネームは破棄され、同じ接続で後続のメッセージは届く
    // given (前提条件):
    let addr = spawn_in_memory_server().await;
    let mut client = connect(addr, 1).await;

    // when (操作):
    send_json(&mut client, r#"{"nickname":"   ","content":"hello"}"#).await;
    send_json(&mut client, "not json").await;
    send_json(&mut client, r#"{"nickname":"bob","content":"after"}"#).await;

    // then (期待する結果):
    let event = next_event(&mut client).await;
    assert_eq!(event["type"], "message");
    assert_eq!(event["message"]["id"], 1);
    assert_eq!(event["message"]["content"], "after");

    let history = get_json(format!("http://{}/messages", addr)).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_disconnect_announces_decremented_count() {
    // テスト項目: 切断すると残りのクライアントに減った接続数が通知される
    // given (前提条件):
    let addr = spawn_in_memory_server().await;
    let mut alice = connect(addr, 1).await;
    let mut bob = connect(addr, 2).await;
    assert_eq!(next_event(&mut alice).await["count"], 2);

    // when (操作):
    bob.close(None).await.unwrap();

    // then (期待する結果):
    let event = next_event(&mut alice).await;
    assert_eq!(event["type"], "users_count");
    assert_eq!(event["count"], 1);
}

#[tokio::test]
async fn test_history_limit_and_order_with_sqlite() {
    // テスト項目: 履歴は件数制限が適用され、古い順に並ぶ（SQLite ストア）
    // given (前提条件):
    let repository = SqliteMessageRepository::connect("sqlite::memory:")
        .await
        .unwrap();
    let addr = spawn_server(Arc::new(repository)).await;
    let mut client = connect(addr, 1).await;
    for content in ["one", "two", "three"] {
        send_json(
            &mut client,
            &format!(r#"{{"nickname":"alice","content":"{}"}}"#, content),
        )
        .await;
        assert_eq!(next_event(&mut client).await["message"]["content"], content);
    }

    // when (操作):
    let limited = get_json(format!("http://{}/messages?limit=2", addr)).await;
    let empty = get_json(format!("http://{}/messages?limit=0", addr)).await;

    // then (期待する結果):
    let limited = limited.as_array().unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0]["content"], "two");
    assert_eq!(limited[1]["content"], "three");
    assert!(limited[0]["id"].as_i64().unwrap() < limited[1]["id"].as_i64().unwrap());
    assert!(empty.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: /health が {"status":"ok"} を返す
    // given (前提条件):
    let addr = spawn_in_memory_server().await;

    // when (操作):
    let body = get_json(format!("http://{}/health", addr)).await;

    // then (期待する結果):
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

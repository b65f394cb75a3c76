//! MessagePusher trait 定義
//!
//! 接続中のクライアント集合（ライブセット）の管理と、全クライアントへの
//! イベント配信（ファンアウト）のインターフェースを定義します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, ServerEvent};

/// 1 接続あたりの送信キューの容量（フレーム数）
pub const PUSHER_CHANNEL_CAPACITY: usize = 256;

/// 接続ごとの送信キュー（送信側）
pub type PusherChannel = mpsc::Sender<String>;

/// 接続ごとの送信キュー（受信側）。接続の writer タスクが所有する
pub type PusherReceiver = mpsc::Receiver<String>;

/// 新しい送信キューを作成
pub fn pusher_channel() -> (PusherChannel, PusherReceiver) {
    mpsc::channel(PUSHER_CHANNEL_CAPACITY)
}

/// ブロードキャスト 1 回分の配信結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// キューへの投入に成功した接続数
    pub delivered: usize,
    /// キューが閉じている・満杯で配信できなかった接続数
    pub failed: usize,
}

impl BroadcastReport {
    /// 配信対象となった接続数（配信時点のライブセットの大きさ）
    ///
    /// 接続数の通知では、通知した接続数と一致する。
    pub fn recipients(&self) -> usize {
        self.delivered + self.failed
    }
}

/// MessagePusher trait
///
/// ライブセットを排他的に所有し、登録・削除・件数取得・配信の
/// すべてをこの trait 経由で行う。
///
/// ## 配信の保証
///
/// - 配信は登録・削除と排他制御され、一貫したスナップショットに対して行われる
/// - 個々の接続への配信失敗は握りつぶされ、他の接続への配信や呼び出し元に影響しない
/// - 配信は非ブロッキング（送信キューが満杯の接続にはそのイベントを届けない）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続をライブセットに登録し、登録後の接続数を返す
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) -> usize;

    /// 接続をライブセットから削除する（冪等）
    ///
    /// 実際に削除した場合は `true`、存在しなかった場合は `false` を返す。
    async fn unregister_client(&self, connection_id: &ConnectionId) -> bool;

    /// イベントを全接続に配信
    ///
    /// `Err` はイベントのエンコードに失敗した場合のみ返す。
    async fn broadcast(&self, event: &ServerEvent) -> Result<BroadcastReport, MessagePushError>;

    /// 現在の接続数を計算し、その値を全接続に配信
    ///
    /// 接続数の計算と配信は同じロックの中で行われる。通知した接続数は
    /// `BroadcastReport::recipients()` で得られる。
    async fn broadcast_connection_count(&self) -> Result<BroadcastReport, MessagePushError>;

    /// 現在の接続数
    async fn connection_count(&self) -> usize;
}

//! サーバーから全接続に配信するイベント

use super::entity::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// メッセージが保存され、全参加者に配信される
    MessagePosted(Message),
    /// 接続数が変化した
    ConnectionCountChanged(usize),
}

//! MessagePusher trait 定義
//!
//! ## 責務
//!
//! - 接続ごとの送信チャンネル（`PusherChannel`）の登録・解除
//! - 単一接続へのプッシュ、全接続へのディレクトリ配信
//!
//! ## 設計ノート
//!
//! 送信は `UnboundedSender::send` で行うため、相手が遅くてもブロックしない。
//! これにより、ディレクトリのガードを保持したままプッシュしても
//! 他の接続の処理を止めることはない。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{entity::ConnectedUser, error::MessagePushError, value_object::ConnectionId};

/// Outbound channel of one connection. Its receiver is drained by the socket writer task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 新しく開いた接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続を登録解除。登録されていなければ `false`
    async fn unregister_client(&self, connection_id: &ConnectionId) -> bool;

    /// 単一の接続に送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// ディレクトリのスナップショットを全ての登録済み接続に配信
    ///
    /// 一部の接続への送信失敗は他の接続への配信を妨げない。
    /// 受け渡しに成功した接続数を返す。
    async fn broadcast_directory(&self, snapshot: &[ConnectedUser]) -> usize;

    /// 登録済み（オープン中）の接続数
    async fn count_connections(&self) -> usize;
}

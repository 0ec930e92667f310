//! UseCase: 切断処理
//!
//! ## 責務
//!
//! - 切断した接続のディレクトリエントリと送信チャンネルを削除する
//! - 残りの接続に更新後のディレクトリを配信する
//!
//! ## 設計ノート
//!
//! 削除・登録解除・配信は全て同じガードの内側で行う。
//! これにより、並行する SendMessage が削除済みの接続を解決することも、
//! 並行する announce の配信がこの配信と入れ替わることもない。
//! 接続が announce 前に閉じた場合もディレクトリ（変更なし）を配信する。

use std::sync::Arc;

use crate::domain::{ConnectedUser, ConnectionId, DirectoryRepository, MessagePusher};

/// Result of a disconnect, observed inside the critical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    /// The entry bound to the connection, if it had announced.
    pub removed: Option<ConnectedUser>,
    /// Directory after the removal, as broadcast.
    pub snapshot: Vec<ConnectedUser>,
    /// Remaining connections the broadcast was handed to.
    pub delivered: usize,
}

pub struct DisconnectClientUseCase {
    repository: Arc<dyn DirectoryRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectClientUseCase {
    pub fn new(
        repository: Arc<dyn DirectoryRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Forget `connection_id` and tell everyone else. Idempotent.
    pub async fn execute(&self, connection_id: &ConnectionId) -> Removed {
        let mut directory = self.repository.lock().await;
        let removed = directory.remove_connection(connection_id);
        self.message_pusher.unregister_client(connection_id).await;
        let snapshot = directory.snapshot();
        let delivered = self.message_pusher.broadcast_directory(&snapshot).await;
        drop(directory);

        match &removed {
            Some(user) => tracing::info!(
                "User {} went offline (connection '{}')",
                user.user_id,
                connection_id
            ),
            None => tracing::info!(
                "Connection '{}' closed without a directory entry",
                connection_id
            ),
        }
        tracing::debug!(
            "Online users: {}, directory sent to {} connection(s)",
            snapshot.len(),
            delivered
        );

        Removed {
            removed,
            snapshot,
            delivered,
        }
    }
}

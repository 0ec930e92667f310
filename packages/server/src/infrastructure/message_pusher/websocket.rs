//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続 ID ごとの送信チャンネルを管理する
//! - ディレクトリのスナップショットを `getOnlineUsers` イベントに変換して全接続に配信する
//!
//! ## 設計ノート
//!
//! UI 層が WebSocket ごとに unbounded channel を作り、その sender をここに登録する。
//! 受信側はソケットの書き込みタスクが読み出すので、送信が遅い相手を待つことはない。
//!
//! UseCase はディレクトリのガードを保持したままこの型のメソッドを呼ぶ。
//! 内部マップのロックは各メソッド内で完結させ、外に持ち出さない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectedUser, ConnectionId, MessagePushError, MessagePusher, PusherChannel,
};
use crate::infrastructure::dto::{conversion::online_users, websocket::ServerEvent};

pub struct WebSocketMessagePusher {
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { clients }
    }
}

impl WebSocketMessagePusher {
    /// Send `content` to every registered connection; returns how many accepted it.
    async fn broadcast_all(&self, content: &str) -> usize {
        let clients = self.clients.lock().await;

        let mut delivered = 0;
        for (connection_id, sender) in clients.iter() {
            match sender.send(content.to_string()) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::warn!(
                        "Failed to push broadcast to connection '{}', skipping",
                        connection_id
                    );
                }
            }
        }
        delivered
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) -> bool {
        let mut clients = self.clients.lock().await;
        let existed = clients.remove(connection_id).is_some();
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
        existed
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|_| MessagePushError::ReceiverClosed(connection_id.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast_directory(&self, snapshot: &[ConnectedUser]) -> usize {
        let frame = match ServerEvent::GetOnlineUsers(online_users(snapshot)).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode getOnlineUsers: {}", e);
                return 0;
            }
        };
        let delivered = self.broadcast_all(&frame).await;
        tracing::debug!(
            "Broadcast directory of {} user(s) to {} connection(s)",
            snapshot.len(),
            delivered
        );
        delivered
    }

    async fn count_connections(&self) -> usize {
        let clients = self.clients.lock().await;
        clients.len()
    }
}

//! UseCase: 接続処理
//!
//! ## 責務
//!
//! - 新しい接続に ConnectionId を割り当て、送信チャンネルを MessagePusher に登録する
//!
//! ## 設計ノート
//!
//! 接続直後はまだ UserId を持たないため、ディレクトリには触れず、配信も行わない。
//! 取得するのは MessagePusher 内部のロックだけなので、ロック順序の制約はない。

use std::sync::Arc;

use presence_relay_shared::time::Clock;

use crate::domain::{ConnectionId, MessagePusher, OpenConnection, PusherChannel, Timestamp};

pub struct ConnectClientUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectClientUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            message_pusher,
            clock,
        }
    }

    /// Allocate a connection id and register the connection's outbound channel.
    pub async fn execute(&self, sender: PusherChannel) -> OpenConnection {
        let connection = OpenConnection::new(
            ConnectionId::generate(),
            Timestamp::new(self.clock.now_millis()),
        );
        self.message_pusher
            .register_client(connection.id, sender)
            .await;

        tracing::info!("New connection: {}", connection.id);
        connection
    }
}

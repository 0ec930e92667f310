//! UseCase: point-to-point relay
//!
//! ## 責務
//!
//! - 宛先 UserId に紐付いた接続にだけ、ペイロードを 1 回送信する
//! - 宛先がオフラインなら何もせずに破棄する（送信者には通知しない）
//!
//! ## 設計ノート
//!
//! 宛先の検索と送信は同じガードの内側で行う。切断処理もガードの内側で
//! エントリ削除と送信チャンネルの登録解除を行うため、切断が完了した接続に
//! メッセージが届くことはない。

use std::sync::Arc;

use crate::domain::{ConnectionId, DirectoryRepository, MessagePusher, UserId};

/// What happened to a relayed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered(ConnectionId),
    Dropped(DropReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// No directory entry for the recipient.
    RecipientOffline,
    /// The entry exists but its socket writer is already gone.
    ConnectionClosed,
}

pub struct SendMessageUseCase {
    repository: Arc<dyn DirectoryRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn DirectoryRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Forward `message` to the single connection bound to `recipient`.
    pub async fn execute(&self, recipient: &UserId, message: &str) -> Delivery {
        let directory = self.repository.lock().await;

        let Some(connection_id) = directory.connection_of(recipient) else {
            tracing::debug!("Recipient {} is offline, dropping message", recipient);
            return Delivery::Dropped(DropReason::RecipientOffline);
        };

        // Still under the guard: no disconnect can interleave with the push
        let pushed = self.message_pusher.push_to(&connection_id, message).await;
        drop(directory);

        match pushed {
            Ok(()) => {
                tracing::debug!(
                    "Relayed message to {} on connection '{}'",
                    recipient,
                    connection_id
                );
                Delivery::Delivered(connection_id)
            }
            Err(e) => {
                tracing::debug!("Dropping message to {}: {}", recipient, e);
                Delivery::Dropped(DropReason::ConnectionClosed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        domain::{
            ConnectedUser, DuplicatePolicy, MessagePushError, MockMessagePusher, Timestamp,
        },
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryDirectoryRepository,
        },
    };
    use mockall::predicate::eq;
    use tokio::sync::mpsc;

    async fn register(repository: &InMemoryDirectoryRepository, name: &str) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        repository.lock().await.announce(
            ConnectedUser::new(UserId::text(name), connection_id, Timestamp::new(0)),
            DuplicatePolicy::IgnoreDuplicate,
        );
        connection_id
    }

    #[tokio::test]
    async fn test_message_is_pushed_exactly_once_to_recipient() {
        // テスト項目: 宛先の接続にだけ、ちょうど 1 回送信される
        // given (前提条件):
        let repository = Arc::new(InMemoryDirectoryRepository::default());
        let _conn_a = register(&repository, "alice").await;
        let conn_b = register(&repository, "bob").await;

        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .with(eq(conn_b), eq("payload"))
            .times(1)
            .returning(|_, _| Ok(()));
        pusher.expect_broadcast_directory().never();
        let usecase = SendMessageUseCase::new(repository, Arc::new(pusher));

        // when (操作):
        let delivery = usecase.execute(&UserId::text("bob"), "payload").await;

        // then (期待する結果):
        assert_eq!(delivery, Delivery::Delivered(conn_b));
    }

    #[tokio::test]
    async fn test_message_to_unknown_recipient_is_dropped() {
        // テスト項目: ディレクトリにいない宛先へのメッセージは何も送信せずに破棄される
        // given (前提条件):
        let repository = Arc::new(InMemoryDirectoryRepository::default());
        register(&repository, "alice").await;

        let mut pusher = MockMessagePusher::new();
        pusher.expect_push_to().never();
        pusher.expect_broadcast_directory().never();
        let usecase = SendMessageUseCase::new(repository, Arc::new(pusher));

        // when (操作):
        let delivery = usecase.execute(&UserId::text("ghost"), "payload").await;

        // then (期待する結果):
        assert_eq!(delivery, Delivery::Dropped(DropReason::RecipientOffline));
    }

    #[tokio::test]
    async fn test_message_to_closing_connection_is_dropped() {
        // テスト項目: エントリはあるが送信チャンネルがない場合も破棄として扱われる
        // given (前提条件):
        let repository = Arc::new(InMemoryDirectoryRepository::default());
        register(&repository, "bob").await;

        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .times(1)
            .returning(|id, _| Err(MessagePushError::ConnectionNotFound(id.to_string())));
        let usecase = SendMessageUseCase::new(repository, Arc::new(pusher));

        // when (操作):
        let delivery = usecase.execute(&UserId::text("bob"), "payload").await;

        // then (期待する結果):
        assert_eq!(delivery, Delivery::Dropped(DropReason::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_sender_does_not_receive_its_own_message() {
        // テスト項目: 送信者には自分のメッセージが返ってこない
        // given (前提条件):
        let repository = Arc::new(InMemoryDirectoryRepository::default());
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let conn_a = register(&repository, "alice").await;
        let conn_b = register(&repository, "bob").await;
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        pusher.register_client(conn_a, tx_a).await;
        pusher.register_client(conn_b, tx_b).await;
        let usecase = SendMessageUseCase::new(repository, pusher);

        // when (操作):
        usecase.execute(&UserId::text("bob"), "hi bob").await;

        // then (期待する結果):
        assert_eq!(rx_b.recv().await, Some("hi bob".to_string()));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_lookup_waits_for_in_flight_disconnect() {
        // テスト項目: 切断処理がディレクトリを保持している間、送信は待たされ、切断後の接続には届かない
        // given (前提条件):
        let repository = Arc::new(InMemoryDirectoryRepository::default());
        let pusher = Arc::new(WebSocketMessagePusher::default());
        let conn_b = register(&repository, "bob").await;
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        pusher.register_client(conn_b, tx_b).await;
        let usecase = Arc::new(SendMessageUseCase::new(repository.clone(), pusher.clone()));

        // 切断処理と同じ順序でガードを取る
        let mut directory = repository.lock().await;

        // when (操作):
        let sending = {
            let usecase = usecase.clone();
            tokio::spawn(async move { usecase.execute(&UserId::text("bob"), "late").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let blocked = !sending.is_finished();

        directory.remove_connection(&conn_b);
        pusher.unregister_client(&conn_b).await;
        drop(directory);
        let delivery = sending.await.unwrap();

        // then (期待する結果):
        assert!(blocked);
        assert_eq!(delivery, Delivery::Dropped(DropReason::RecipientOffline));
        assert!(rx_b.try_recv().is_err());
    }
}

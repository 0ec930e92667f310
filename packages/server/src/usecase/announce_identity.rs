//! UseCase: identity announcement
//!
//! ## 責務
//!
//! - 接続に UserId を紐付ける（重複時は `DuplicatePolicy` に従う）
//! - 変更後のディレクトリを全てのオープン中の接続に配信する
//!
//! ## 設計ノート
//!
//! 登録と配信は同じガードの内側で行う。ガードを解放してから配信すると、
//! 並行する announce の配信が逆順に届き、古い一覧が最後に残ることがある。
//! 配信はガードの内側で直列化されるため、各接続が最後に受け取る一覧は
//! 常にディレクトリの最新状態と一致する。

use std::sync::Arc;

use crate::domain::{
    AnnounceOutcome, ConnectedUser, DirectoryRepository, DuplicatePolicy, MessagePusher,
    OpenConnection, UserId,
};

/// Result of an announcement, observed inside the critical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announced {
    pub outcome: AnnounceOutcome,
    /// Directory right after the announcement, as broadcast.
    pub snapshot: Vec<ConnectedUser>,
    /// Connections the broadcast was handed to.
    pub delivered: usize,
}

pub struct AnnounceIdentityUseCase {
    repository: Arc<dyn DirectoryRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    policy: DuplicatePolicy,
}

impl AnnounceIdentityUseCase {
    pub fn new(
        repository: Arc<dyn DirectoryRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        policy: DuplicatePolicy,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            policy,
        }
    }

    /// Register `user_id` for `connection` and broadcast the directory.
    ///
    /// Never fails: duplicates are resolved by the policy and logged.
    /// A broadcast is sent after every announce, even when nothing changed.
    pub async fn execute(&self, connection: &OpenConnection, user_id: UserId) -> Announced {
        if user_id.is_blank() {
            tracing::warn!(
                "Connection '{}' announced a blank user id, accepting as-is",
                connection.id
            );
        }

        let user = ConnectedUser::new(user_id.clone(), connection.id, connection.opened_at);

        let mut directory = self.repository.lock().await;
        let outcome = directory.announce(user, self.policy);
        let snapshot = directory.snapshot();
        let delivered = self.message_pusher.broadcast_directory(&snapshot).await;
        drop(directory);

        match &outcome {
            AnnounceOutcome::Registered => {
                tracing::info!("User {} registered on connection '{}'", user_id, connection.id);
            }
            AnnounceOutcome::DuplicateIgnored { owner } => {
                tracing::warn!(
                    "User {} is already online on connection '{}'; connection '{}' stays unregistered",
                    user_id,
                    owner,
                    connection.id
                );
            }
            AnnounceOutcome::Replaced { previous } => {
                tracing::warn!(
                    "User {} moved from connection '{}' to '{}'",
                    user_id,
                    previous,
                    connection.id
                );
            }
            AnnounceOutcome::AlreadyIdentified { bound_to } if bound_to == &user_id => {
                tracing::debug!(
                    "Connection '{}' re-announced {}, nothing to do",
                    connection.id,
                    user_id
                );
            }
            AnnounceOutcome::AlreadyIdentified { bound_to } => {
                tracing::warn!(
                    "Connection '{}' is already bound to {}, ignoring announce of {}",
                    connection.id,
                    bound_to,
                    user_id
                );
            }
        }
        tracing::debug!(
            "Online users: {}, directory sent to {} connection(s)",
            snapshot.len(),
            delivered
        );

        Announced {
            outcome,
            snapshot,
            delivered,
        }
    }
}

//! UseCase: ディレクトリの参照
//!
//! ## 責務
//!
//! - HTTP のデバッグ用エンドポイント向けに、ディレクトリと接続数を返す
//!
//! ## 設計ノート
//!
//! 読み取り専用。スナップショットと接続数は別々のロックで取得するため、
//! 同時に変更があると両者が一瞬だけずれることがある（表示用途なので許容）。

use std::sync::Arc;

use crate::domain::{ConnectedUser, DirectoryRepository, MessagePusher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryView {
    pub users: Vec<ConnectedUser>,
    pub open_connections: usize,
}

pub struct GetDirectoryUseCase {
    repository: Arc<dyn DirectoryRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetDirectoryUseCase {
    pub fn new(
        repository: Arc<dyn DirectoryRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    pub async fn execute(&self) -> DirectoryView {
        DirectoryView {
            users: self.repository.snapshot().await,
            open_connections: self.message_pusher.count_connections().await,
        }
    }
}

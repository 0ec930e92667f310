//! InMemory Directory Repository 実装
//!
//! ## 責務
//!
//! - `Directory` エンティティを `tokio::sync::Mutex` で包み、プロセス内で共有する
//! - 排他ガード（`OwnedMutexGuard`）を UseCase 層に貸し出す
//!
//! ## 設計ノート
//!
//! ガードは `lock_owned` で取得するため `'static` で、UseCase の中で
//! `.await` をまたいで保持できる。プレゼンス情報はプロセスローカルで、
//! 再起動すると失われる。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectedUser, Directory, DirectoryGuard, DirectoryRepository};

pub struct InMemoryDirectoryRepository {
    directory: Arc<Mutex<Directory>>,
}

impl InMemoryDirectoryRepository {
    pub fn new(directory: Arc<Mutex<Directory>>) -> Self {
        Self { directory }
    }
}

impl Default for InMemoryDirectoryRepository {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(Directory::new())))
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn lock(&self) -> DirectoryGuard {
        self.directory.clone().lock_owned().await
    }

    async fn snapshot(&self) -> Vec<ConnectedUser> {
        let directory = self.directory.lock().await;
        directory.snapshot()
    }
}

//! Repository trait 定義
//!
//! ## 責務
//!
//! - 接続中ユーザーのディレクトリ（`Directory`）へのアクセスを提供する
//! - 具体的な実装は Infrastructure 層が提供する（依存性の逆転）
//!
//! ## 設計ノート
//!
//! ディレクトリの変更・検索と、その結果にもとづく送信（ブロードキャスト、
//! 単一接続へのプッシュ）は 1 つのクリティカルセクションで行う必要がある。
//! そのため個別の CRUD メソッドではなく、排他ガード `DirectoryGuard` を返す。
//! ガードを保持している間に行った送信は、他のどの変更とも交差しない。
//!
//! ロック順序は常に「ディレクトリ → MessagePusher 内部のマップ」。
//! 逆順で取得するコードを書いてはいけない（デッドロックになる）。

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use super::entity::{ConnectedUser, Directory};

/// Exclusive access to the directory; released on drop.
pub type DirectoryGuard = OwnedMutexGuard<Directory>;

/// Directory Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// ディレクトリの排他ガードを取得
    async fn lock(&self) -> DirectoryGuard;

    /// 登録順のスナップショットを取得（読み取り専用）
    async fn snapshot(&self) -> Vec<ConnectedUser>;
}

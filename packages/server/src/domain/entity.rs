//! Entities of the presence domain.
//!
//! ## 責務
//!
//! - `Directory`: UserId と接続の対応表。重複ポリシーにもとづく登録・削除を行う
//! - `ConnectedUser` / `OpenConnection`: 接続とその識別情報
//!
//! ## 設計ノート
//!
//! `Directory` 自体は同期的な値で、排他制御は持たない。
//! 並行アクセスは Repository が `Mutex` で包んで直列化する。

use std::collections::HashMap;

use super::{
    policy::DuplicatePolicy,
    value_object::{ConnectionId, Timestamp, UserId},
};

/// A connection accepted by the transport that may not have announced an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConnection {
    pub id: ConnectionId,
    pub opened_at: Timestamp,
}

impl OpenConnection {
    pub fn new(id: ConnectionId, opened_at: Timestamp) -> Self {
        Self { id, opened_at }
    }
}

/// One active connection bound to an application-level identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedUser {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
    pub connected_at: Timestamp,
}

impl ConnectedUser {
    pub fn new(user_id: UserId, connection_id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            user_id,
            connection_id,
            connected_at,
        }
    }
}

/// Result of an identity announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnounceOutcome {
    /// New entry inserted.
    Registered,
    /// The id is owned by another connection and the policy kept it there.
    DuplicateIgnored { owner: ConnectionId },
    /// The id was rebound from `previous` to the announcing connection.
    Replaced { previous: ConnectionId },
    /// The connection already announced; the directory is unchanged.
    AlreadyIdentified { bound_to: UserId },
}

#[derive(Debug, Clone)]
struct Entry {
    user: ConnectedUser,
    seq: u64,
}

/// In-memory mapping from user identity to the connection that announced it.
///
/// Invariants:
/// - at most one entry per `UserId`
/// - at most one entry per `ConnectionId`
/// - `by_connection` is the exact inverse of `entries`
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: HashMap<UserId, Entry>,
    by_connection: HashMap<ConnectionId, UserId>,
    next_seq: u64,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `user` unless its identity or its connection is already present.
    pub fn announce(&mut self, user: ConnectedUser, policy: DuplicatePolicy) -> AnnounceOutcome {
        if let Some(bound_to) = self.by_connection.get(&user.connection_id) {
            return AnnounceOutcome::AlreadyIdentified {
                bound_to: bound_to.clone(),
            };
        }

        let owner = self
            .entries
            .get(&user.user_id)
            .map(|entry| entry.user.connection_id);

        match (owner, policy) {
            (None, _) => {
                self.insert(user);
                AnnounceOutcome::Registered
            }
            (Some(owner), DuplicatePolicy::IgnoreDuplicate) => {
                AnnounceOutcome::DuplicateIgnored { owner }
            }
            (Some(previous), DuplicatePolicy::Upsert) => {
                self.by_connection.remove(&previous);
                self.insert(user);
                AnnounceOutcome::Replaced { previous }
            }
        }
    }

    fn insert(&mut self, user: ConnectedUser) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_connection
            .insert(user.connection_id, user.user_id.clone());
        self.entries
            .insert(user.user_id.clone(), Entry { user, seq });
    }

    /// Remove the entry bound to `connection_id`, if any.
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Option<ConnectedUser> {
        let user_id = self.by_connection.remove(connection_id)?;
        self.entries.remove(&user_id).map(|entry| entry.user)
    }

    pub fn connection_of(&self, user_id: &UserId) -> Option<ConnectionId> {
        self.entries
            .get(user_id)
            .map(|entry| entry.user.connection_id)
    }

    /// Entries in registration order.
    pub fn snapshot(&self) -> Vec<ConnectedUser> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.user.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn user(name: &str) -> ConnectedUser {
        ConnectedUser::new(UserId::text(name), ConnectionId::generate(), Timestamp::new(0))
    }

    fn user_ids(directory: &Directory) -> Vec<String> {
        directory
            .snapshot()
            .into_iter()
            .map(|u| u.user_id.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_announce_registers_new_user() {
        // テスト項目: 未登録のユーザーは登録される
        // given (前提条件):
        let mut directory = Directory::new();
        let alice = user("alice");

        // when (操作):
        let outcome = directory.announce(alice.clone(), DuplicatePolicy::IgnoreDuplicate);

        // then (期待する結果):
        assert_eq!(outcome, AnnounceOutcome::Registered);
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.connection_of(&alice.user_id), Some(alice.connection_id));
        assert_eq!(directory.snapshot(), vec![alice.clone()]);
    }

    #[test]
    fn test_duplicate_announce_keeps_first_connection() {
        // テスト項目: ignore-duplicate では最初の接続が保持される
        // given (前提条件):
        let mut directory = Directory::new();
        let first = user("alice");
        let second = user("alice");
        directory.announce(first.clone(), DuplicatePolicy::IgnoreDuplicate);

        // when (操作):
        let outcome = directory.announce(second.clone(), DuplicatePolicy::IgnoreDuplicate);

        // then (期待する結果):
        assert_eq!(
            outcome,
            AnnounceOutcome::DuplicateIgnored {
                owner: first.connection_id
            }
        );
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.connection_of(&first.user_id), Some(first.connection_id));
        assert_eq!(directory.snapshot(), vec![first.clone()]);
    }

    #[test]
    fn test_duplicate_announce_with_upsert_rebinds() {
        // テスト項目: upsert では新しい接続に付け替えられ、重複エントリは生まれない
        // given (前提条件):
        let mut directory = Directory::new();
        let first = user("alice");
        let second = user("alice");
        directory.announce(first.clone(), DuplicatePolicy::Upsert);

        // when (操作):
        let outcome = directory.announce(second.clone(), DuplicatePolicy::Upsert);

        // then (期待する結果):
        assert_eq!(
            outcome,
            AnnounceOutcome::Replaced {
                previous: first.connection_id
            }
        );
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.connection_of(&second.user_id), Some(second.connection_id));
        assert_eq!(directory.snapshot(), vec![second.clone()]);

        // 古い接続の切断は新しいエントリに影響しない
        assert_eq!(directory.remove_connection(&first.connection_id), None);
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_connection_cannot_announce_twice() {
        // テスト項目: 同じ接続からの 2 回目の announce はディレクトリを変更しない
        // given (前提条件):
        let mut directory = Directory::new();
        let alice = user("alice");
        directory.announce(alice.clone(), DuplicatePolicy::IgnoreDuplicate);
        let renamed = ConnectedUser::new(UserId::text("mallory"), alice.connection_id, Timestamp::new(0));

        // when (操作):
        let outcome = directory.announce(renamed, DuplicatePolicy::Upsert);

        // then (期待する結果):
        assert_eq!(
            outcome,
            AnnounceOutcome::AlreadyIdentified {
                bound_to: alice.user_id.clone()
            }
        );
        assert_eq!(user_ids(&directory), vec!["alice"]);
    }

    #[test]
    fn test_remove_connection() {
        // テスト項目: 接続 ID でエントリを削除できる
        // given (前提条件):
        let mut directory = Directory::new();
        let alice = user("alice");
        let bob = user("bob");
        directory.announce(alice.clone(), DuplicatePolicy::IgnoreDuplicate);
        directory.announce(bob.clone(), DuplicatePolicy::IgnoreDuplicate);

        // when (操作):
        let removed = directory.remove_connection(&alice.connection_id);

        // then (期待する結果):
        assert_eq!(removed, Some(alice.clone()));
        assert_eq!(directory.connection_of(&alice.user_id), None);
        assert_eq!(user_ids(&directory), vec!["bob"]);
    }

    #[test]
    fn test_remove_unknown_connection_is_noop() {
        // テスト項目: announce していない接続の削除は何もしない
        // given (前提条件):
        let mut directory = Directory::new();
        directory.announce(user("alice"), DuplicatePolicy::IgnoreDuplicate);

        // when (操作):
        let removed = directory.remove_connection(&ConnectionId::generate());

        // then (期待する結果):
        assert_eq!(removed, None);
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_snapshot_is_in_registration_order() {
        // テスト項目: スナップショットは登録順に並ぶ
        // given (前提条件):
        let mut directory = Directory::new();
        for name in ["charlie", "alice", "bob"] {
            directory.announce(user(name), DuplicatePolicy::IgnoreDuplicate);
        }

        // when (操作):
        let names = user_ids(&directory);

        // then (期待する結果):
        assert_eq!(names, vec!["charlie", "alice", "bob"]);
    }

    #[test]
    fn test_uniqueness_under_mixed_announces() {
        // テスト項目: どのような announce の列でも同じ UserId のエントリは 1 つまで
        // given (前提条件):
        let names = ["alice", "bob", "alice", "carol", "bob", "alice", "1"];

        for policy in [DuplicatePolicy::IgnoreDuplicate, DuplicatePolicy::Upsert] {
            let mut directory = Directory::new();

            // when (操作):
            for name in names {
                directory.announce(user(name), policy);
            }
            directory.announce(
                ConnectedUser::new(UserId::number("1"), ConnectionId::generate(), Timestamp::new(0)),
                policy,
            );

            // then (期待する結果):
            let snapshot = directory.snapshot();
            let unique: HashSet<&UserId> = snapshot.iter().map(|u| &u.user_id).collect();
            assert_eq!(unique.len(), snapshot.len());
            assert_eq!(directory.len(), 5);
        }
    }
}

//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## ロックの構成
//!
//! - `index`: レジストリ全体（Room ID → ハンドル、ルームコード → Room ID）。
//!   `RwLock` で保護し、保持時間は HashMap 操作の間だけ。
//! - `RoomHandle`: Room ごとの `Mutex`。参加・退出・投稿などの read-then-write は
//!   この内側で行う。
//!
//! `index` を保持したまま Room のロックを待つことはありません。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    RepositoryError, Room, RoomCode, RoomHandle, RoomId, RoomRepository, RoomSnapshot,
};

#[derive(Default)]
struct RegistryIndex {
    rooms: HashMap<RoomId, RoomHandle>,
    /// Codes of active rooms only
    active_codes: HashMap<RoomCode, RoomId>,
}

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    index: RwLock<RegistryIndex>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert(&self, room: Room) -> Result<RoomHandle, RepositoryError> {
        let mut index = self.index.write().await;
        if index.active_codes.contains_key(&room.code) {
            return Err(RepositoryError::RoomCodeTaken(room.code.into_string()));
        }
        if index.rooms.contains_key(&room.id) {
            return Err(RepositoryError::DuplicateRoomId(room.id.to_string()));
        }

        let id = room.id;
        let code = room.code.clone();
        let handle = Arc::new(Mutex::new(room));
        index.rooms.insert(id, handle.clone());
        index.active_codes.insert(code, id);
        Ok(handle)
    }

    async fn find_by_code(&self, code: &RoomCode) -> Option<RoomHandle> {
        let index = self.index.read().await;
        let id = index.active_codes.get(code)?;
        index.rooms.get(id).cloned()
    }

    async fn find_by_id(&self, id: &RoomId) -> Option<RoomHandle> {
        let index = self.index.read().await;
        index.rooms.get(id).cloned()
    }

    async fn list_active(&self) -> Vec<RoomSnapshot> {
        let mut snapshots = Vec::new();
        for handle in self.all_handles().await {
            let room = handle.lock().await;
            if room.is_active {
                snapshots.push(room.snapshot());
            }
        }
        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        snapshots
    }

    async fn all_handles(&self) -> Vec<RoomHandle> {
        let index = self.index.read().await;
        index.rooms.values().cloned().collect()
    }

    async fn release_code(&self, code: &RoomCode, id: &RoomId) {
        let mut index = self.index.write().await;
        if index.active_codes.get(code) == Some(id) {
            index.active_codes.remove(code);
            tracing::debug!("Room code '{}' released", code);
        }
    }

    async fn remove(&self, id: &RoomId) -> Option<RoomHandle> {
        let mut index = self.index.write().await;
        let handle = index.rooms.remove(id)?;
        index.active_codes.retain(|_, room_id| room_id != id);
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Participant, RoomCode, RoomId, TerminationReason, Timestamp,
        test_support::{name, settings, user},
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRepository の登録・検索・一覧・コード解放・削除
    // - ルームコードの一意性（アクティブなルームの間でのみ）
    //
    // 【なぜこのテストが必要か】
    // - UseCase 層はコード衝突時の再試行をこの Repository のエラーに依存している
    // - 終了したルームのコードが検索で復活しないことを保証する必要がある
    // ========================================

    fn room_with_code(code: &str, host: &str, created_at: i64) -> Room {
        Room::open(
            RoomId::generate(),
            RoomCode::new(code.to_string()).unwrap(),
            settings(4),
            Participant::new(user(host), name(host), Timestamp::new(created_at)),
            Timestamp::new(created_at),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find_by_code() {
        // テスト項目: 登録したルームをコードと ID の両方で検索できる
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let room = room_with_code("AAAAAA", "alice", 1_000);
        let id = room.id;

        // when (操作):
        repo.insert(room).await.unwrap();

        // then (期待する結果):
        let by_code = repo
            .find_by_code(&RoomCode::new("aaaaaa".to_string()).unwrap())
            .await
            .unwrap();
        assert_eq!(by_code.lock().await.id, id);
        assert!(repo.find_by_id(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_insert_rejects_active_code_collision() {
        // テスト項目: アクティブなルームと同じコードでの登録は RoomCodeTaken になる
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        repo.insert(room_with_code("AAAAAA", "alice", 1_000))
            .await
            .unwrap();

        // when (操作):
        let result = repo.insert(room_with_code("AAAAAA", "bob", 2_000)).await;

        // then (期待する結果):
        assert_eq!(
            result.err(),
            Some(RepositoryError::RoomCodeTaken("AAAAAA".to_string()))
        );
    }

    #[tokio::test]
    async fn test_release_code_of_ended_room() {
        // テスト項目: 終了したルームのコードを解放すると検索できなくなり、再利用できる
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let room = room_with_code("AAAAAA", "alice", 1_000);
        let id = room.id;
        let code = room.code.clone();
        let handle = repo.insert(room).await.unwrap();
        handle
            .lock()
            .await
            .deactivate(TerminationReason::Idle, Timestamp::new(2_000));

        // when (操作):
        repo.release_code(&code, &id).await;

        // then (期待する結果):
        assert!(repo.find_by_code(&code).await.is_none());
        assert!(repo.list_active().await.is_empty());
        // 記録自体は残る（墓石）
        assert!(!repo.find_by_id(&id).await.unwrap().lock().await.is_active);

        // 同じコードで新しいルームを作れる
        assert!(
            repo.insert(room_with_code("AAAAAA", "bob", 4_000))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_release_code_ignores_other_owner() {
        // テスト項目: 別のルームが所有するコードは解放されない
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let room = room_with_code("AAAAAA", "alice", 1_000);
        let code = room.code.clone();
        repo.insert(room).await.unwrap();

        // when (操作):
        repo.release_code(&code, &RoomId::generate()).await;

        // then (期待する結果):
        assert!(repo.find_by_code(&code).await.is_some());
    }

    #[tokio::test]
    async fn test_list_active_newest_first() {
        // テスト項目: アクティブなルームのみが新しい順に返される
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        repo.insert(room_with_code("AAAAAA", "alice", 1_000))
            .await
            .unwrap();
        let newer = room_with_code("BBBBBB", "bob", 2_000);
        let newer_id = newer.id;
        repo.insert(newer).await.unwrap();
        let ended = room_with_code("CCCCCC", "carol", 3_000);
        let ended = repo.insert(ended).await.unwrap();
        ended
            .lock()
            .await
            .deactivate(TerminationReason::Empty, Timestamp::new(3_500));

        // when (操作):
        let active = repo.list_active().await;

        // then (期待する結果):
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, newer_id);
        assert_eq!(active[1].code.as_str(), "AAAAAA");
    }

    #[tokio::test]
    async fn test_remove_drops_record() {
        // テスト項目: 削除したルームは ID でも検索できなくなる
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let room = room_with_code("AAAAAA", "alice", 1_000);
        let id = room.id;
        repo.insert(room).await.unwrap();

        // when (操作):
        let removed = repo.remove(&id).await;

        // then (期待する結果):
        assert!(removed.is_some());
        assert!(repo.find_by_id(&id).await.is_none());
        assert!(repo.all_handles().await.is_empty());
    }
}

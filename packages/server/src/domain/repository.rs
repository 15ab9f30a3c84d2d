//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{RepositoryError, Room, RoomCode, RoomId, RoomSnapshot};

/// Exclusive handle to one room.
///
/// Every read-then-write on a room happens while holding this lock, which
/// serializes mutations per room while other rooms proceed in parallel.
pub type RoomHandle = Arc<Mutex<Room>>;

/// Room Registry
///
/// Room のライフサイクル（作成・検索・コード解放・削除）を管理します。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
///
/// 実装はレジストリ全体のロックを保持したまま Room のロックを待ってはいけません
/// （Room のロックを保持したまま `release_code` が呼ばれるため）。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Register a new room. Fails if its code is held by another active room.
    async fn insert(&self, room: Room) -> Result<RoomHandle, RepositoryError>;

    /// Look up by shareable code. Only codes of active rooms resolve.
    async fn find_by_code(&self, code: &RoomCode) -> Option<RoomHandle>;

    /// Look up by internal id, active or not.
    async fn find_by_id(&self, id: &RoomId) -> Option<RoomHandle>;

    /// Snapshots of every active room.
    async fn list_active(&self) -> Vec<RoomSnapshot>;

    /// Handles of every stored room, active or not.
    async fn all_handles(&self) -> Vec<RoomHandle>;

    /// Free a code once its room is no longer active. No-op if the code now belongs elsewhere.
    async fn release_code(&self, code: &RoomCode, id: &RoomId);

    /// Drop a room record entirely.
    async fn remove(&self, id: &RoomId) -> Option<RoomHandle>;
}

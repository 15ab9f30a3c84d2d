//! Broadcast Gateway の境界
//!
//! UseCase はミューテーションを確定させた直後、Room のロックを保持したまま
//! `publish` を同期的に呼び出します。`publish` は送信キューへ積むだけで、
//! 遅いクライアントへの配信を待つことはありません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{EventEnvelope, RoomId, UserId};

/// Outbound channel of one connected client (serialized JSON frames)
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Identifies one registered connection. A user may hold several per room (e.g. two tabs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Attach a client connection to a room. Earlier connections of the same user stay attached.
    async fn register_client(
        &self,
        room_id: RoomId,
        user_id: UserId,
        sender: PusherChannel,
    ) -> ConnectionId;

    /// Detach one connection. A no-op if it was already detached.
    async fn unregister_connection(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        connection: ConnectionId,
    );

    /// Detach every connection the user holds in the room
    async fn unregister_client(&self, room_id: &RoomId, user_id: &UserId);

    /// Enqueue an event for delivery. Never blocks on delivery.
    fn publish(&self, envelope: EventEnvelope);
}

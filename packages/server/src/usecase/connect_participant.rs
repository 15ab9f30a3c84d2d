//! UseCase: WebSocket 接続の登録
//!
//! 接続はイベントの受信経路であり、参加状態そのものではありません。
//! 先に接続を登録してから Room のロック内で参加状態を確認します。
//! 確認前に退出・終了がコミットされていれば登録を取り消し、確認後であれば
//! 退出・終了の側が登録を解除するので、非参加者の登録が残ることはありません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel, RoomId, RoomRepository, UserId};

use super::error::RoomError;

/// WebSocket 接続登録のユースケース
pub struct ConnectParticipantUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続を登録する
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionId)` - 登録した接続。切断時に `disconnect` へ渡す
    /// * `Err(RoomError::NotFound)` - ルームが存在しない、または終了している
    /// * `Err(RoomError::Forbidden)` - 参加者ではない
    pub async fn execute(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        sender: PusherChannel,
    ) -> Result<ConnectionId, RoomError> {
        let handle = self
            .repository
            .find_by_id(room_id)
            .await
            .ok_or(RoomError::NotFound)?;

        let connection = self
            .message_pusher
            .register_client(*room_id, user_id.clone(), sender)
            .await;

        let admitted = {
            let room = handle.lock().await;
            room.ensure_active().map_err(RoomError::from).and_then(|()| {
                if room.is_participant(user_id) {
                    Ok(())
                } else {
                    Err(RoomError::not_participant())
                }
            })
        };

        if let Err(e) = admitted {
            self.disconnect(room_id, user_id, connection).await;
            tracing::warn!("'{}' could not connect to room {}: {}", user_id, room_id, e);
            return Err(e);
        }
        Ok(connection)
    }

    /// 接続の登録を解除する。ルームからは退出しない
    pub async fn disconnect(&self, room_id: &RoomId, user_id: &UserId, connection: ConnectionId) {
        self.message_pusher
            .unregister_connection(room_id, user_id, connection)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::{
        domain::test_support::{name, user},
        infrastructure::message_pusher::WebSocketMessagePusher,
        usecase::{JoinRoomUseCase, LeaveRoomUseCase, test_support::Fixture},
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 参加者だけが接続を登録できること
    // - 拒否された接続の登録が残らないこと
    // - 退出すると、その時点で開いている接続が解除されること
    // ========================================

    struct Harness {
        fixture: Fixture,
        pusher: Arc<WebSocketMessagePusher>,
        connect: ConnectParticipantUseCase,
    }

    fn harness() -> Harness {
        let fixture = Fixture::new();
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let connect = ConnectParticipantUseCase::new(fixture.repository.clone(), pusher.clone());
        Harness {
            fixture,
            pusher,
            connect,
        }
    }

    #[tokio::test]
    async fn test_participant_connects() {
        // テスト項目: 参加者は接続を登録でき、切断で登録が解除される
        // given (前提条件):
        let h = harness();
        let created = h.fixture.create_room("alice", 4, false).await;
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let connection = h
            .connect
            .execute(&created.room.id, &user("alice"), tx)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(h.pusher.connection_count().await, 1);
        h.connect
            .disconnect(&created.room.id, &user("alice"), connection)
            .await;
        assert_eq!(h.pusher.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_rejected_connection_leaves_no_registration() {
        // テスト項目: 参加者以外・終了済みルームへの接続は拒否され、登録は残らない
        // given (前提条件):
        let h = harness();
        let created = h.fixture.create_room("alice", 4, false).await;
        let (tx_stranger, mut rx_stranger) = mpsc::unbounded_channel();

        // when (操作):
        let stranger = h
            .connect
            .execute(&created.room.id, &user("mallory"), tx_stranger)
            .await;
        LeaveRoomUseCase::new(
            h.fixture.repository.clone(),
            h.fixture.pusher.clone(),
            h.fixture.clock.clone(),
        )
        .execute(&created.room.id, &user("alice"))
        .await
        .unwrap();
        let (tx_host, _rx_host) = mpsc::unbounded_channel();
        let after_end = h
            .connect
            .execute(&created.room.id, &user("alice"), tx_host)
            .await;

        // then (期待する結果):
        assert_eq!(stranger, Err(RoomError::not_participant()));
        assert_eq!(after_end, Err(RoomError::NotFound));
        assert_eq!(h.pusher.connection_count().await, 0);
        // 登録が取り消されたので sender は破棄されている
        assert_eq!(rx_stranger.recv().await, None);
    }

    #[tokio::test]
    async fn test_leave_drops_open_connections() {
        // テスト項目: 接続中のユーザーが退出すると、その接続の登録は解除される
        // given (前提条件):
        let h = harness();
        let created = h.fixture.create_room("alice", 4, false).await;
        JoinRoomUseCase::new(
            h.fixture.repository.clone(),
            h.pusher.clone(),
            h.fixture.issuer.clone(),
            h.fixture.clock.clone(),
        )
        .execute_by_id(&created.room.id, user("bob"), name("Bob"), None)
        .await
        .unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        h.connect
            .execute(&created.room.id, &user("bob"), tx)
            .await
            .unwrap();

        // when (操作):
        LeaveRoomUseCase::new(
            h.fixture.repository.clone(),
            h.pusher.clone(),
            h.fixture.clock.clone(),
        )
        .execute(&created.room.id, &user("bob"))
        .await
        .unwrap();

        // then (期待する結果):
        assert_eq!(h.pusher.connection_count().await, 0);
        assert_eq!(rx.recv().await, None);
    }
}

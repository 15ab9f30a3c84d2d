//! UseCase: ルーム終了（ホストのみ）

use std::sync::Arc;

use kaimono_shared::time::Clock;

use crate::domain::{MessagePusher, RoomId, RoomRepository, Timestamp, UserId};

use super::{error::RoomError, room_ended::finish_ended_room};

/// ルーム終了のユースケース
pub struct TerminateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl TerminateRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// ルームを終了し、その時点の全参加者に room-terminated を通知する
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 終了した
    /// * `Err(RoomError::NotFound)` - ルームが存在しない、またはすでに終了している
    /// * `Err(RoomError::Forbidden)` - 要求者がホストではない
    pub async fn execute(&self, room_id: &RoomId, requester: &UserId) -> Result<(), RoomError> {
        let handle = self
            .repository
            .find_by_id(room_id)
            .await
            .ok_or(RoomError::NotFound)?;

        let mut room = handle.lock().await;
        let now = Timestamp::new(self.clock.now_millis());
        let members = match room.terminate(requester, now) {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!("'{}' could not terminate room {}: {}", requester, room.code, e);
                return Err(e.into());
            }
        };

        tracing::info!("Room {} terminated by host '{}'", room.code, requester);
        finish_ended_room(
            self.repository.as_ref(),
            self.message_pusher.as_ref(),
            &room,
            members,
        )
        .await;
        Ok(())
    }
}

//! UseCase: ルーム退出
//!
//! 参加していないユーザーの退出は何もせずに成功します（冪等）。
//! ホストが退出した場合、または最後の参加者が退出した場合はルームが終了します。

use std::sync::Arc;

use kaimono_shared::time::Clock;

use crate::domain::{
    EventEnvelope, MessagePusher, RoomEvent, RoomId, RoomRepository, RoomSnapshot, Timestamp,
    UserId,
};

use super::{error::RoomError, room_ended::finish_ended_room};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
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

    /// 退出を実行
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSnapshot)` - 退出後のルームの状態（終了した場合は `is_active == false`）
    /// * `Err(RoomError::NotFound)` - ルームが存在しない
    pub async fn execute(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<RoomSnapshot, RoomError> {
        let handle = self
            .repository
            .find_by_id(room_id)
            .await
            .ok_or(RoomError::NotFound)?;

        let snapshot = {
            let mut room = handle.lock().await;
            let now = Timestamp::new(self.clock.now_millis());
            let Some(outcome) = room.remove_participant(user_id, now) else {
                tracing::debug!("'{}' is not in room {}, nothing to do", user_id, room.code);
                return Ok(room.snapshot());
            };

            self.message_pusher.publish(EventEnvelope {
                recipients: outcome.remaining.clone(),
                event: RoomEvent::ParticipantLeft {
                    room_id: room.id,
                    is_host: room.is_host(user_id),
                    participant: outcome.participant,
                    left_at: now,
                    participant_count: outcome.remaining.len(),
                },
            });
            tracing::info!("'{}' left room {}", user_id, room.code);

            if outcome.terminated.is_some() {
                finish_ended_room(
                    self.repository.as_ref(),
                    self.message_pusher.as_ref(),
                    &room,
                    outcome.remaining,
                )
                .await;
            }
            room.snapshot()
        };

        self.message_pusher
            .unregister_client(room_id, user_id)
            .await;
        Ok(snapshot)
    }
}

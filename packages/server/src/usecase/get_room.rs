//! UseCase: ルーム詳細の取得（参加者のみ）

use std::sync::Arc;

use crate::domain::{RoomId, RoomRepository, RoomSnapshot, UserId};

use super::error::RoomError;

pub struct GetRoomUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        room_id: &RoomId,
        requester: &UserId,
    ) -> Result<RoomSnapshot, RoomError> {
        let handle = self
            .repository
            .find_by_id(room_id)
            .await
            .ok_or(RoomError::NotFound)?;
        let room = handle.lock().await;
        room.ensure_active()?;
        if !room.is_participant(requester) {
            return Err(RoomError::not_participant());
        }
        Ok(room.snapshot())
    }
}

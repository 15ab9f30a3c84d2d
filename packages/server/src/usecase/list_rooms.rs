//! UseCase: アクティブなルームの一覧

use std::sync::Arc;

use crate::domain::{RoomRepository, RoomSnapshot};

pub struct ListRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl ListRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// Active rooms, newest first
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        self.repository.list_active().await
    }
}

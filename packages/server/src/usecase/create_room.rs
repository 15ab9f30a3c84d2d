//! UseCase: ルーム作成
//!
//! 作成者はホストとして自動的に参加します。パスワード付きルームの場合、
//! 平文のパスワードはこのユースケースの戻り値でのみ返され、以降は保持されません。

use std::sync::Arc;

use kaimono_shared::time::Clock;

use crate::domain::{
    Capacity, CredentialIssuer, DisplayName, Participant, RepositoryError, Room,
    RoomDescription, RoomId, RoomKind, RoomName, RoomRepository, RoomSettings, RoomSnapshot,
    Timestamp, UserId,
};

use super::{error::RoomError, password::hash_password};

/// Upper bound on room code draws before giving up
const MAX_CODE_ATTEMPTS: usize = 32;

#[derive(Debug, Clone)]
pub struct CreateRoomCommand {
    pub creator_id: UserId,
    pub creator_name: DisplayName,
    pub name: String,
    pub description: String,
    pub capacity: u32,
    pub require_password: bool,
    pub kind: RoomKind,
}

/// Newly created room and its one-time credentials
#[derive(Debug, Clone)]
pub struct CreatedRoom {
    pub room: RoomSnapshot,
    /// Plaintext password, only when the room is gated
    pub password: Option<String>,
}

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    credentials: Arc<dyn CredentialIssuer>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        credentials: Arc<dyn CredentialIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            credentials,
            clock,
        }
    }

    /// ルーム作成を実行
    ///
    /// # Returns
    ///
    /// * `Ok(CreatedRoom)` - 作成されたルームと一度きりの認証情報
    /// * `Err(RoomError::Validation)` - ルーム名が空、定員が 2 未満など
    pub async fn execute(&self, command: CreateRoomCommand) -> Result<CreatedRoom, RoomError> {
        let name = RoomName::new(command.name)?;
        let description = RoomDescription::new(command.description)?;
        let capacity = Capacity::new(command.capacity)?;

        let (password, password_hash) = if command.require_password {
            let plain = self.credentials.generate_password();
            let hash = hash_password(&self.credentials, plain.clone()).await?;
            (Some(plain), Some(hash))
        } else {
            (None, None)
        };

        let settings = RoomSettings {
            kind: command.kind,
            name,
            description,
            capacity,
            password_hash,
        };
        let now = Timestamp::new(self.clock.now_millis());
        let host = Participant::new(command.creator_id, command.creator_name, now);

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self.credentials.generate_room_code();
            let room = Room::open(
                RoomId::generate(),
                code,
                settings.clone(),
                host.clone(),
                now,
            );

            match self.repository.insert(room).await {
                Ok(handle) => {
                    let snapshot = handle.lock().await.snapshot();
                    tracing::info!(
                        "Room {} ({}) created by '{}' (capacity {}, password: {})",
                        snapshot.code,
                        snapshot.id,
                        snapshot.host_id,
                        snapshot.capacity.value(),
                        snapshot.requires_password
                    );
                    return Ok(CreatedRoom {
                        room: snapshot,
                        password,
                    });
                }
                Err(RepositoryError::RoomCodeTaken(code)) => {
                    tracing::debug!("Room code '{}' collided (attempt {})", code, attempt);
                }
                Err(e) => return Err(RoomError::Internal(e.to_string())),
            }
        }

        tracing::error!(
            "Could not find a free room code after {} attempts",
            MAX_CODE_ATTEMPTS
        );
        Err(RoomError::Internal(
            "Could not allocate a room code".to_string(),
        ))
    }
}

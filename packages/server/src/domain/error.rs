//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object の生成に失敗した理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Invalid room code '{0}'")]
    InvalidRoomCode(String),

    #[error("Invalid room id '{0}'")]
    InvalidRoomId(String),

    #[error("User id must not be empty")]
    EmptyUserId,

    #[error("User id must be at most {0} characters")]
    UserIdTooLong(usize),

    #[error("Display name must not be empty")]
    EmptyDisplayName,

    #[error("Display name must be at most {0} characters")]
    DisplayNameTooLong(usize),

    #[error("Room name must not be empty")]
    EmptyRoomName,

    #[error("Room name must be at most {0} characters")]
    RoomNameTooLong(usize),

    #[error("Room description must be at most {0} characters")]
    DescriptionTooLong(usize),

    #[error("Room capacity must be at least {0}")]
    CapacityTooSmall(u32),

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Message must be at most {0} characters")]
    MessageTooLong(usize),

    #[error("Invalid product id '{0}'")]
    InvalidProductId(String),
}

/// Room エンティティのルール違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomRuleError {
    #[error("Room is no longer active")]
    Inactive,

    #[error("Room is full")]
    CapacityExceeded,

    #[error("User is not a participant of this room")]
    NotParticipant,

    #[error("Only the host can do this")]
    NotHost,
}

/// データストアのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room code '{0}' is already used by an active room")]
    RoomCodeTaken(String),

    #[error("Room '{0}' already exists")]
    DuplicateRoomId(String),
}

/// パスワードのハッシュ化に失敗した
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to hash password: {0}")]
pub struct CredentialError(pub String);

//! UseCase 層のエラー定義
//!
//! すべてのユースケースは `RoomError` を返します。各バリアントは呼び出し単位で完結する
//! ユーザー向けの失敗であり、自動リトライは行いません。

use thiserror::Error;

use crate::domain::{CredentialError, RoomRuleError, ValueObjectError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// Room is missing or no longer active
    #[error("Room not found")]
    NotFound,

    /// Wrong or missing room password
    #[error("Invalid password")]
    AuthError,

    #[error("{0}")]
    Forbidden(String),

    #[error("Room is full")]
    CapacityExceeded,

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoomError {
    /// Stable machine-readable error code
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AuthError => "auth_error",
            Self::Forbidden(_) => "forbidden",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::Validation(_) => "validation_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub(crate) fn not_participant() -> Self {
        Self::Forbidden("You are not a participant of this room".to_string())
    }

    pub(crate) fn not_host() -> Self {
        Self::Forbidden("Only the host can terminate the room".to_string())
    }
}

impl From<ValueObjectError> for RoomError {
    fn from(e: ValueObjectError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<RoomRuleError> for RoomError {
    fn from(e: RoomRuleError) -> Self {
        match e {
            RoomRuleError::Inactive => Self::NotFound,
            RoomRuleError::CapacityExceeded => Self::CapacityExceeded,
            RoomRuleError::NotParticipant => Self::not_participant(),
            RoomRuleError::NotHost => Self::not_host(),
        }
    }
}

impl From<CredentialError> for RoomError {
    fn from(e: CredentialError) -> Self {
        Self::Internal(e.to_string())
    }
}

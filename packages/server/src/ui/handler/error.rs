//! HTTP error responses.
//!
//! すべてのエラーは `{"error": {"kind": "...", "message": "..."}}` の形で返します。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::http::{ErrorBody, ErrorDetail},
    usecase::RoomError,
};

/// Failure of a single API call
#[derive(Debug)]
pub enum ApiError {
    Room(RoomError),
    /// Identity headers missing or malformed
    Unauthenticated(String),
    /// Request body could not be parsed
    InvalidRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Room(e) => match e {
                RoomError::NotFound => StatusCode::NOT_FOUND,
                RoomError::AuthError => StatusCode::UNAUTHORIZED,
                RoomError::Forbidden(_) => StatusCode::FORBIDDEN,
                RoomError::CapacityExceeded => StatusCode::CONFLICT,
                RoomError::Validation(_) => StatusCode::BAD_REQUEST,
                RoomError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (kind, message) = match self {
            // 内部エラーの詳細はログにのみ残す
            Self::Room(RoomError::Internal(_)) => {
                ("internal_error", "Internal server error".to_string())
            }
            Self::Room(e) => (e.kind(), e.to_string()),
            Self::Unauthenticated(message) => ("unauthenticated", message.clone()),
            Self::InvalidRequest(message) => ("validation_error", message.clone()),
        };
        ErrorDetail {
            kind: kind.to_string(),
            message,
        }
    }
}

impl From<RoomError> for ApiError {
    fn from(e: RoomError) -> Self {
        Self::Room(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Room(RoomError::Internal(cause)) = &self {
            tracing::error!("Request failed: {}", cause);
        }
        (status, Json(ErrorBody { error: self.detail() })).into_response()
    }
}

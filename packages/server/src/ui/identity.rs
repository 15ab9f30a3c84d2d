//! Caller identity extracted from request headers.
//!
//! 認証は上流のプロキシが行い、検証済みのユーザー ID と表示名を
//! `x-user-id` / `x-display-name` ヘッダーで渡します。
//! このサーバーはヘッダーの形式のみを検証します。

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::domain::{DisplayName, UserId};

use super::handler::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const DISPLAY_NAME_HEADER: &str = "x-display-name";

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: DisplayName,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_ID_HEADER)?;
        let display_name = header_value(parts, DISPLAY_NAME_HEADER)?;

        let user_id = UserId::new(user_id).map_err(|e| {
            tracing::debug!("Rejected {} header: {}", USER_ID_HEADER, e);
            ApiError::Unauthenticated(format!("Invalid {USER_ID_HEADER} header"))
        })?;
        let display_name = DisplayName::new(display_name).map_err(|e| {
            tracing::debug!("Rejected {} header: {}", DISPLAY_NAME_HEADER, e);
            ApiError::Unauthenticated(format!("Invalid {DISPLAY_NAME_HEADER} header"))
        })?;

        Ok(Self {
            user_id,
            display_name,
        })
    }
}

fn header_value(parts: &Parts, name: &str) -> Result<String, ApiError> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthenticated(format!("Missing {name} header")))?;
    // 表示名は日本語などの非 ASCII 文字を含むことがある
    std::str::from_utf8(value.as_bytes())
        .map(str::to_string)
        .map_err(|_| ApiError::Unauthenticated(format!("Invalid {name} header")))
}

//! HTTP API request and response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::MessageDto;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKindDto {
    #[default]
    Ephemeral,
    Durable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub capacity: u32,
    #[serde(default)]
    pub require_password: bool,
    #[serde(default)]
    pub kind: RoomKindDto,
}

/// Returned exactly once, at creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsDto {
    pub room_code: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room: RoomDetailDto,
    pub credentials: CredentialsDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinByCodeRequest {
    pub room_code: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareProductRequest {
    pub product_id: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesQuery {
    pub after: Option<u64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub room_code: String,
    pub name: String,
    pub description: String,
    pub kind: RoomKindDto,
    pub requires_password: bool,
    pub capacity: u32,
    pub participant_count: usize,
    pub host_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDetailDto {
    pub user_id: String,
    pub display_name: String,
    pub is_host: bool,
    pub joined_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub room_code: String,
    pub name: String,
    pub description: String,
    pub kind: RoomKindDto,
    pub requires_password: bool,
    pub capacity: u32,
    pub host_id: String,
    pub participants: Vec<ParticipantDetailDto>,
    pub is_active: bool,
    pub message_count: usize,
    pub created_at: String,
    pub last_activity_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMessageDto {
    #[serde(flatten)]
    pub message: MessageDto,
    /// Live product data for product shares; `null` when unresolvable or not a share
    pub product: Option<ProductDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePageDto {
    pub messages: Vec<RenderedMessageDto>,
    pub has_more: bool,
    pub next_cursor: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

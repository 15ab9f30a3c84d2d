//! WebSocket frame DTOs.
//!
//! Server → client frames carry a `type` discriminator matching the event name
//! (`participant-joined`, `participant-left`, `room-terminated`, `message`,
//! `product-shared`). Clients may send `chat` frames.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    ParticipantJoined,
    ParticipantLeft,
    RoomTerminated,
    Message,
    ProductShared,
    Chat,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub user_id: String,
    pub display_name: String,
    pub is_host: bool,
    /// Unix timestamp in milliseconds
    pub joined_at: i64,
}

/// A message of the room log, as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: u64,
    pub room_id: String,
    pub sender_id: String,
    pub sender_name: String,
    /// "text" or "product-share"
    pub kind: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantJoinedMessage {
    pub r#type: MessageType,
    pub room_id: String,
    pub participant: ParticipantInfo,
    pub participant_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantLeftMessage {
    pub r#type: MessageType,
    pub room_id: String,
    pub participant: ParticipantInfo,
    pub left_at: i64,
    pub participant_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTerminatedMessage {
    pub r#type: MessageType,
    pub room_id: String,
    pub reason: String,
    pub terminated_at: i64,
}

/// Used for both `message` and `product-shared` frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMessageEvent {
    pub r#type: MessageType,
    pub room_id: String,
    pub message: MessageDto,
}

/// Client → server chat frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatInput {
    pub r#type: MessageType,
    pub content: String,
}

/// Sent back to a single client when its frame was rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub kind: String,
    pub message: String,
}

//! Conversion logic between DTOs and domain entities.

use kaimono_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    Message, Participant, ProductSummary, RenderedMessage, RoomEvent, RoomId, RoomKind,
    RoomSnapshot, UserId,
};
use crate::infrastructure::dto::{http, websocket as ws};

// ========================================
// DTO → Domain
// ========================================

impl From<http::RoomKindDto> for RoomKind {
    fn from(dto: http::RoomKindDto) -> Self {
        match dto {
            http::RoomKindDto::Ephemeral => Self::Ephemeral,
            http::RoomKindDto::Durable => Self::Durable,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<RoomKind> for http::RoomKindDto {
    fn from(kind: RoomKind) -> Self {
        match kind {
            RoomKind::Ephemeral => Self::Ephemeral,
            RoomKind::Durable => Self::Durable,
        }
    }
}

pub fn participant_info(participant: &Participant, host_id: &UserId) -> ws::ParticipantInfo {
    ws::ParticipantInfo {
        user_id: participant.user_id.as_str().to_string(),
        display_name: participant.display_name.as_str().to_string(),
        is_host: &participant.user_id == host_id,
        joined_at: participant.joined_at.value(),
    }
}

pub fn message_dto(room_id: &RoomId, message: &Message) -> ws::MessageDto {
    ws::MessageDto {
        id: message.id.value(),
        room_id: room_id.to_string(),
        sender_id: message.sender_id.as_str().to_string(),
        sender_name: message.sender_name.as_str().to_string(),
        kind: message.kind().as_str().to_string(),
        content: message.content().to_string(),
        product_id: message.product_id().map(|id| id.as_str().to_string()),
        created_at: message.created_at.value(),
    }
}

impl From<ProductSummary> for http::ProductDto {
    fn from(product: ProductSummary) -> Self {
        Self {
            id: product.id.as_str().to_string(),
            name: product.name,
            price: product.price,
            currency: product.currency,
            image_url: product.image_url,
        }
    }
}

pub fn rendered_message_dto(room_id: &RoomId, rendered: RenderedMessage) -> http::RenderedMessageDto {
    http::RenderedMessageDto {
        message: message_dto(room_id, &rendered.message),
        product: rendered.product.map(Into::into),
    }
}

impl From<&RoomSnapshot> for http::RoomSummaryDto {
    fn from(room: &RoomSnapshot) -> Self {
        Self {
            id: room.id.to_string(),
            room_code: room.code.as_str().to_string(),
            name: room.name.as_str().to_string(),
            description: room.description.as_str().to_string(),
            kind: room.kind.into(),
            requires_password: room.requires_password,
            capacity: room.capacity.value(),
            participant_count: room.participants.len(),
            host_id: room.host_id.as_str().to_string(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&RoomSnapshot> for http::RoomDetailDto {
    fn from(room: &RoomSnapshot) -> Self {
        Self {
            id: room.id.to_string(),
            room_code: room.code.as_str().to_string(),
            name: room.name.as_str().to_string(),
            description: room.description.as_str().to_string(),
            kind: room.kind.into(),
            requires_password: room.requires_password,
            capacity: room.capacity.value(),
            host_id: room.host_id.as_str().to_string(),
            participants: room
                .participants
                .iter()
                .map(|p| http::ParticipantDetailDto {
                    user_id: p.user_id.as_str().to_string(),
                    display_name: p.display_name.as_str().to_string(),
                    is_host: room.is_host(&p.user_id),
                    joined_at: timestamp_to_rfc3339(p.joined_at.value()),
                })
                .collect(),
            is_active: room.is_active,
            message_count: room.message_count,
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            last_activity_at: timestamp_to_rfc3339(room.last_activity_at.value()),
        }
    }
}

/// Serialize a domain event into its WebSocket frame.
pub fn encode_event(event: &RoomEvent) -> Result<String, serde_json::Error> {
    match event {
        RoomEvent::ParticipantJoined {
            room_id,
            participant,
            is_host,
            participant_count,
        } => serde_json::to_string(&ws::ParticipantJoinedMessage {
            r#type: ws::MessageType::ParticipantJoined,
            room_id: room_id.to_string(),
            participant: ws::ParticipantInfo {
                is_host: *is_host,
                ..participant_info(participant, &participant.user_id)
            },
            participant_count: *participant_count,
        }),
        RoomEvent::ParticipantLeft {
            room_id,
            participant,
            is_host,
            left_at,
            participant_count,
        } => serde_json::to_string(&ws::ParticipantLeftMessage {
            r#type: ws::MessageType::ParticipantLeft,
            room_id: room_id.to_string(),
            participant: ws::ParticipantInfo {
                is_host: *is_host,
                ..participant_info(participant, &participant.user_id)
            },
            left_at: left_at.value(),
            participant_count: *participant_count,
        }),
        RoomEvent::RoomTerminated {
            room_id,
            reason,
            terminated_at,
        } => serde_json::to_string(&ws::RoomTerminatedMessage {
            r#type: ws::MessageType::RoomTerminated,
            room_id: room_id.to_string(),
            reason: reason.as_str().to_string(),
            terminated_at: terminated_at.value(),
        }),
        RoomEvent::Message { room_id, message } => serde_json::to_string(&ws::RoomMessageEvent {
            r#type: ws::MessageType::Message,
            room_id: room_id.to_string(),
            message: message_dto(room_id, message),
        }),
        RoomEvent::ProductShared { room_id, message } => {
            serde_json::to_string(&ws::RoomMessageEvent {
                r#type: ws::MessageType::ProductShared,
                room_id: room_id.to_string(),
                message: message_dto(room_id, message),
            })
        }
    }
}

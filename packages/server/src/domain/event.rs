//! Room state-change events delivered through the `MessagePusher`.

use super::{
    entity::{Message, MessageKind, Participant, TerminationReason},
    value_object::{RoomId, Timestamp, UserId},
};

/// Every committed mutation produces one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    ParticipantJoined {
        room_id: RoomId,
        participant: Participant,
        is_host: bool,
        participant_count: usize,
    },
    ParticipantLeft {
        room_id: RoomId,
        participant: Participant,
        is_host: bool,
        left_at: Timestamp,
        participant_count: usize,
    },
    RoomTerminated {
        room_id: RoomId,
        reason: TerminationReason,
        terminated_at: Timestamp,
    },
    Message {
        room_id: RoomId,
        message: Message,
    },
    ProductShared {
        room_id: RoomId,
        message: Message,
    },
}

impl RoomEvent {
    pub fn room_id(&self) -> RoomId {
        match self {
            Self::ParticipantJoined { room_id, .. }
            | Self::ParticipantLeft { room_id, .. }
            | Self::RoomTerminated { room_id, .. }
            | Self::Message { room_id, .. }
            | Self::ProductShared { room_id, .. } => *room_id,
        }
    }

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::ParticipantJoined { .. } => "participant-joined",
            Self::ParticipantLeft { .. } => "participant-left",
            Self::RoomTerminated { .. } => "room-terminated",
            Self::Message { .. } => "message",
            Self::ProductShared { .. } => "product-shared",
        }
    }

    /// Build the event matching the kind of an appended message.
    pub fn for_message(room_id: RoomId, message: Message) -> Self {
        match message.kind() {
            MessageKind::Text => Self::Message { room_id, message },
            MessageKind::ProductShare => Self::ProductShared { room_id, message },
        }
    }
}

/// An event plus the members that must receive it, fixed at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEnvelope {
    pub recipients: Vec<UserId>,
    pub event: RoomEvent,
}

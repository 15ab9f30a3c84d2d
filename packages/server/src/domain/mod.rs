//! Domain layer: room aggregate, value objects, events and the trait seams
//! implemented by the infrastructure layer.

pub mod credential;
pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod product;
pub mod repository;
pub mod value_object;

pub use credential::CredentialIssuer;
pub use entity::{
    JoinOutcome, LeaveOutcome, Message, MessageBody, MessageKind, MessagePage, MessagePayload,
    Participant, PasswordHash, Room, RoomKind, RoomSettings, RoomSnapshot, TerminationReason,
};
pub use error::{CredentialError, RepositoryError, RoomRuleError, ValueObjectError};
pub use event::{EventEnvelope, RoomEvent};
pub use message_pusher::{ConnectionId, MessagePusher, PusherChannel};
pub use product::{ProductLookup, ProductSummary, RenderedMessage};
pub use repository::{RoomHandle, RoomRepository};
pub use value_object::{
    Capacity, DisplayName, MessageContent, MessageId, ProductId, RoomCode, RoomDescription,
    RoomId, RoomName, Timestamp, UserId,
};

#[cfg(test)]
pub(crate) use entity::test_support;
#[cfg(test)]
pub(crate) use message_pusher::MockMessagePusher;

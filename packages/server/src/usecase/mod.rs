//! UseCase 層
//!
//! 1 つの操作につき 1 つのユースケース構造体を定義します。
//! 各ユースケースは domain 層の trait（Repository, MessagePusher など）にのみ依存し、
//! UI 層から `Arc` で共有されます。

pub mod connect_participant;
pub mod create_room;
pub mod error;
pub mod get_messages;
pub mod get_room;
pub mod join_room;
pub mod leave_room;
pub mod list_rooms;
mod password;
pub mod reclaim_idle_rooms;
mod room_ended;
pub mod send_message;
pub mod terminate_room;

#[cfg(test)]
mod test_support;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::{CreateRoomCommand, CreateRoomUseCase, CreatedRoom};
pub use error::RoomError;
pub use get_messages::{GetMessagesUseCase, RenderedPage};
pub use get_room::GetRoomUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use list_rooms::ListRoomsUseCase;
pub use reclaim_idle_rooms::{ReclaimIdleRoomsUseCase, ReclaimReport};
pub use send_message::SendMessageUseCase;
pub use terminate_room::TerminateRoomUseCase;

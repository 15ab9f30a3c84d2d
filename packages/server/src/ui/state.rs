//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    ConnectParticipantUseCase, CreateRoomUseCase, GetMessagesUseCase, GetRoomUseCase,
    JoinRoomUseCase, LeaveRoomUseCase, ListRoomsUseCase, SendMessageUseCase, TerminateRoomUseCase,
};

/// Shared application state
pub struct AppState {
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub terminate_room_usecase: Arc<TerminateRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
    pub get_room_usecase: Arc<GetRoomUseCase>,
    pub list_rooms_usecase: Arc<ListRoomsUseCase>,
    /// WebSocket 接続の登録・解除
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
}

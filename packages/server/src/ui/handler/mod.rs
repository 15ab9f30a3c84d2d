//! HTTP and WebSocket handlers.

mod error;
mod http;
mod websocket;

pub use error::ApiError;
pub use http::{
    create_room, get_messages, get_room, health_check, join_by_code, join_room, leave_room,
    list_rooms, send_message, share_product, terminate_room,
};
pub use websocket::websocket_handler;

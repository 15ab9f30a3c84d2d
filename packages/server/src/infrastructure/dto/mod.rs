//! Data Transfer Objects (DTOs) for the room server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: real-time event frames
//! - `http`: HTTP API requests and responses

pub mod conversion;
pub mod http;
pub mod websocket;

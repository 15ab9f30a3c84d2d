//! Infrastructure layer: concrete implementations of the domain traits and wire DTOs.

pub mod credential;
pub mod dto;
pub mod message_pusher;
pub mod product;
pub mod repository;

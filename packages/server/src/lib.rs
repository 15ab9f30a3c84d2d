//! Shared shopping room server.
//!
//! Users create small, optionally password-gated rooms, join them by a short
//! code, chat and share products, and receive room events over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

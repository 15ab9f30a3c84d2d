//! UI layer: axum router, handlers and the server runner.

mod handler;
mod identity;
mod server;
mod signal;
pub mod state;

pub use identity::{DISPLAY_NAME_HEADER, Identity, USER_ID_HEADER};
pub use server::Server;

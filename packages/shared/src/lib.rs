//! Utilities shared by the Kaimono server binary and its tests.

pub mod logger;
pub mod time;

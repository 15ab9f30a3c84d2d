//! In-memory implementations backed by `HashMap`.

pub mod room;

pub use room::InMemoryRoomRepository;

//! Room credential generation and verification

use super::{CredentialError, PasswordHash, RoomCode};

pub trait CredentialIssuer: Send + Sync {
    /// Fresh random room code. Uniqueness is checked by the registry.
    fn generate_room_code(&self) -> RoomCode;

    /// Fresh random plaintext password, shown once to the creator.
    fn generate_password(&self) -> String;

    fn hash_password(&self, plain: &str) -> Result<PasswordHash, CredentialError>;

    fn verify_password(&self, plain: &str, hash: &PasswordHash) -> bool;
}

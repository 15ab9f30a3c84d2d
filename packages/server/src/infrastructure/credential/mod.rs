//! Credential issuer implementations.

pub mod argon2_issuer;

pub use argon2_issuer::Argon2CredentialIssuer;

//! Covault Crypto - Cryptographic provider for the shared-custody client
//!
//! This crate provides:
//! - Ed25519 key pairs and request-key derivation from an extended key
//! - Digital signatures over canonical request strings and proposal hashes
//! - Symmetric message encryption (ChaCha20-Poly1305)
//! - Opaque encrypting-key derivation (personal / shared keys)
//! - Invite-secret encoding and decoding
//! - Password-based credential-export encryption (Argon2id)
//!
//! # Security Invariant
//!
//! Every primitive here is deterministic given its inputs (aside from fresh
//! nonces and salts), so the verifier can re-derive any artifact the
//! coordination service claims and compare byte-for-byte.

pub mod cipher;
pub mod hash;
pub mod keys;
pub mod secret;

pub use cipher::*;
pub use hash::*;
pub use keys::*;
pub use secret::*;

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("invalid invite secret")]
    InvalidSecret,

    #[error("key stretching failed: {0}")]
    KeyStretching(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;

impl From<CryptoError> for covault_types::Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidSecret => covault_types::Error::InvalidSecret,
            CryptoError::Decryption(msg) => covault_types::Error::Decryption(msg),
            other => covault_types::Error::Validation(other.to_string()),
        }
    }
}

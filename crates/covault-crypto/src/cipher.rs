//! Symmetric encryption for proposal messages, air-gapped key-ring
//! transport, and password-protected credential exports.
//!
//! ChaCha20-Poly1305 throughout. Message encryption derives its nonce from
//! (key, plaintext), SIV-style: identical inputs produce identical
//! ciphertext, which keeps proposal signatures (computed over the wire form)
//! deterministic. Password-protected exports use a fresh random salt and
//! nonce per export.

use crate::{CryptoError, CryptoResult};
use argon2::{Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit, OsRng};
use chacha20poly1305::{AeadCore, ChaCha20Poly1305, Key, Nonce};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

const NONCE_LEN: usize = 12;

/// Encrypt a plaintext under a 32-byte key; returns base64(nonce || ct).
///
/// Deterministic: the nonce is a digest of (key, plaintext), so nonce reuse
/// only ever pairs with an identical ciphertext.
pub fn encrypt_message(plaintext: &str, key: &[u8; 32]) -> CryptoResult<String> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));

    let mut hasher = Sha256::new();
    hasher.update(b"covault/message-nonce");
    hasher.update(key);
    hasher.update(plaintext.as_bytes());
    let digest = hasher.finalize();
    let nonce = Nonce::from_slice(&digest[..NONCE_LEN]).to_owned();

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(blob))
}

/// Decrypt a base64(nonce || ct) blob under a 32-byte key.
///
/// Fails on wrong key, tampered ciphertext, or malformed input; callers
/// decide whether that is fatal (air-gapped ring) or degradable (message
/// bodies).
pub fn decrypt_message(ciphertext_b64: &str, key: &[u8; 32]) -> CryptoResult<String> {
    let blob = STANDARD
        .decode(ciphertext_b64)
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;

    if blob.len() < NONCE_LEN {
        return Err(CryptoError::Decryption("ciphertext too short".into()));
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CryptoError::Decryption("authentication failed".into()))?;

    String::from_utf8(plaintext).map_err(|e| CryptoError::Decryption(e.to_string()))
}

// Fixed Argon2id parameters for credential-export stretching. These are
// part of the export format: changing them breaks old exports.
const STRETCH_MEMORY_KIB: u32 = 19 * 1024;
const STRETCH_ITERATIONS: u32 = 2;
const STRETCH_PARALLELISM: u32 = 1;

/// Stretch a password into a 32-byte encryption key with Argon2id.
pub fn stretch_password(password: &str, salt: &[u8]) -> CryptoResult<[u8; 32]> {
    let params = Params::new(
        STRETCH_MEMORY_KIB,
        STRETCH_ITERATIONS,
        STRETCH_PARALLELISM,
        Some(32),
    )
    .map_err(|e| CryptoError::KeyStretching(e.to_string()))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CryptoError::KeyStretching(e.to_string()))?;
    Ok(key)
}

/// Encrypt a document under a password; returns base64(salt || nonce || ct).
pub fn encrypt_with_password(plaintext: &str, password: &str) -> CryptoResult<String> {
    let salt: [u8; 16] = rand::random();
    let key = Zeroizing::new(stretch_password(password, &salt)?);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut blob = Vec::with_capacity(salt.len() + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(blob))
}

/// Decrypt a password-protected document. A wrong password surfaces as
/// `CryptoError::Decryption` (the AEAD tag does not authenticate).
pub fn decrypt_with_password(blob_b64: &str, password: &str) -> CryptoResult<String> {
    let blob = STANDARD
        .decode(blob_b64)
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;

    if blob.len() < 16 + NONCE_LEN {
        return Err(CryptoError::Decryption("payload too short".into()));
    }
    let (salt, rest) = blob.split_at(16);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let key = Zeroizing::new(stretch_password(password, salt)?);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CryptoError::Decryption("authentication failed".into()))?;

    String::from_utf8(plaintext).map_err(|e| CryptoError::Decryption(e.to_string()))
}

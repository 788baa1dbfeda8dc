//! Key management for Covault

use crate::{CryptoError, CryptoResult};
use ed25519_dalek::{
    Signature as Ed25519Signature, Signer, SigningKey, Verifier, VerifyingKey,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// A key pair for signing operations
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let verifying_key = signing_key.verifying_key();

        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Create from existing signing key bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();

        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Create from a hex-encoded signing key
    pub fn from_private_hex(hex_key: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(hex_key)
            .map_err(|e| CryptoError::InvalidKeyFormat(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyFormat("private key must be 32 bytes".into()))?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Get the public key as a hex string
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key.as_bytes())
    }

    /// Get the signing key as a hex string (for secure storage only)
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Get the signing key bytes
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Sign a message, returning a hex-encoded signature
    pub fn sign(&self, message: &[u8]) -> CryptoResult<String> {
        let sig = self
            .signing_key
            .try_sign(message)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(hex::encode(sig.to_bytes()))
    }
}

/// Verify a hex-encoded signature against a hex-encoded public key.
///
/// Malformed keys or signatures verify as `false` rather than erroring:
/// the inputs come from the untrusted server, and a garbled artifact is a
/// failed check, not a client fault.
pub fn verify(message: &[u8], signature_hex: &str, public_key_hex: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(sig_array) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
        return false;
    };
    let Ok(key_bytes) = hex::decode(public_key_hex) else {
        return false;
    };
    let Ok(key_array) = <[u8; 32]>::try_from(key_bytes.as_slice()) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_array) else {
        return false;
    };

    let signature = Ed25519Signature::from_bytes(&sig_array);
    verifying_key.verify(message, &signature).is_ok()
}

/// Derive the request key pair deterministically from an extended private
/// key. This is the recovery path: the same xpriv always yields the same
/// identity.
///
/// The derivation itself is an opaque, domain-separated digest; HD key
/// derivation proper is out of scope.
pub fn derive_from_extended_key(xpriv: &str) -> KeyPair {
    let mut hasher = Sha256::new();
    hasher.update(b"covault/request-key");
    hasher.update([0u8]);
    hasher.update(xpriv.as_bytes());
    let seed: [u8; 32] = hasher.finalize().into();
    KeyPair::from_bytes(&seed)
}

/// Derive a 32-byte symmetric encrypting key from key material.
///
/// Labels in use: `"personal"` (from the request private key, never shared)
/// and `"shared"` (from the wallet private key, so any legitimate copayer
/// derives the same key without it ever crossing the wire).
pub fn derive_encrypting_key(seed: &[u8], label: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"covault/encrypting-key/");
    hasher.update(label.as_bytes());
    hasher.update([0u8]);
    hasher.update(seed);
    hasher.finalize().into()
}

/// Derive a copayer id from a hex public key. Every copayer computes the
/// same id for the same key, so ids can be cross-checked offline.
pub fn copayer_id(public_key_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"covault/copayer-id");
    hasher.update([0u8]);
    hasher.update(public_key_hex.as_bytes());
    hex::encode(hasher.finalize())
}

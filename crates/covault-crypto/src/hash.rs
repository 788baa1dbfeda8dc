//! Hashing and deterministic derivation
//!
//! Everything here feeds the verifier: given the same inputs, every copayer
//! derives the same proposal hash, address, and membership digest, so any
//! server-supplied artifact can be checked byte-for-byte.

use crate::{CryptoResult, KeyPair};
use sha2::{Digest, Sha256};

/// Compute SHA-256 of data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The digest a proposal creator signs and every verifier recomputes.
///
/// Field lengths are mixed into the digest so (dest="ab", msg="c") can never
/// collide with (dest="a", msg="bc").
pub fn proposal_hash(to_address: &str, amount: u64, message: Option<&str>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"covault/proposal");
    hasher.update((to_address.len() as u64).to_le_bytes());
    hasher.update(to_address.as_bytes());
    hasher.update(amount.to_le_bytes());
    match message {
        Some(m) => {
            hasher.update([1u8]);
            hasher.update((m.len() as u64).to_le_bytes());
            hasher.update(m.as_bytes());
        }
        None => hasher.update([0u8]),
    }
    hasher.finalize().into()
}

/// Sign a proposal hash; returns the signature set submitted to the server.
pub fn sign_proposal(hash: &[u8; 32], key: &KeyPair) -> CryptoResult<Vec<String>> {
    Ok(vec![key.sign(hash)?])
}

/// The digest signed by the wallet-level key as a copayer's membership proof.
pub fn copayer_proof_digest(name: &str, public_key_hex: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"covault/copayer-proof");
    hasher.update((name.len() as u64).to_le_bytes());
    hasher.update(name.as_bytes());
    hasher.update(public_key_hex.as_bytes());
    hasher.finalize().into()
}

/// Derive the wallet address for a given index from the public key ring.
///
/// The ring is sorted before hashing so every copayer derives the same
/// address regardless of join order. Address/script encoding proper is out
/// of scope; this is a deterministic opaque encoding sensitive to every
/// input byte, which is all the verifier needs.
pub fn derive_address(ring: &[String], m: usize, index: u32) -> String {
    let mut sorted: Vec<&String> = ring.iter().collect();
    sorted.sort();

    let mut hasher = Sha256::new();
    hasher.update(b"covault/address");
    hasher.update((m as u64).to_le_bytes());
    hasher.update((sorted.len() as u64).to_le_bytes());
    for key in sorted {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();

    format!("cv{}", hex::encode(&digest[..20]))
}

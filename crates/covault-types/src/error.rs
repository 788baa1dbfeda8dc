//! Error types for Covault
//!
//! The taxonomy separates four failure classes that callers must treat
//! differently:
//!
//! - **Validation**: a local precondition failed; nothing was sent.
//! - **Server**: the coordination service answered with an error.
//! - **TrustViolation**: a verifier check failed, evidence the service is
//!   compromised. Always fatal to the call, never retryable, never
//!   downgraded.
//! - **Decryption / Transport**: mechanical failures; transport errors
//!   propagate unchanged and no operation retries internally.

use thiserror::Error;

/// Result type for Covault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which verifier predicate failed. Carried inside [`Error::TrustViolation`]
/// so callers can tell the user exactly what the server misrepresented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustFailure {
    /// A copayer's membership proof did not verify against the wallet key
    CopayerProof,
    /// A server-supplied address does not match the locally derived one
    AddressMismatch,
    /// A proposal signature did not verify against the creator's public key
    ProposalSignature,
}

impl std::fmt::Display for TrustFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CopayerProof => write!(f, "copayer membership proof"),
            Self::AddressMismatch => write!(f, "address derivation mismatch"),
            Self::ProposalSignature => write!(f, "proposal signature"),
        }
    }
}

/// Covault error taxonomy
#[derive(Debug, Clone, Error)]
pub enum Error {
    // ========================================================================
    // Validation Errors (local preconditions)
    // ========================================================================

    /// A local precondition failed before anything was sent
    #[error("validation failed: {0}")]
    Validation(String),

    /// An invite secret could not be decoded
    #[error("invalid invite secret")]
    InvalidSecret,

    /// A credential export payload could not be parsed
    #[error("credential import failed: {0}")]
    ImportFailed(String),

    /// Wrong password for an encrypted credential export
    #[error("incorrect password")]
    IncorrectPassword,

    /// An air-gapped key ring did not have the expected number of entries
    #[error("invalid public key ring: expected {expected} keys, got {actual}")]
    InvalidPublicKeyRing { expected: usize, actual: usize },

    // ========================================================================
    // Trust Violations (verifier failures: the server lied)
    // ========================================================================

    /// A verifier check failed; the coordination service supplied data that
    /// does not match what the client re-derived from its own keys
    #[error("trust violation: {0} failed verification")]
    TrustViolation(TrustFailure),

    // ========================================================================
    // Server Errors
    // ========================================================================

    /// Structured error from the coordination service
    #[error("server error {code}: {message}")]
    Server { code: String, message: String },

    // ========================================================================
    // Mechanical Errors
    // ========================================================================

    /// Symmetric decryption failed (fatal for air-gapped ring transport;
    /// best-effort for proposal message bodies)
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Network-level failure, propagated unchanged from the transport
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Whether this error means the coordination service should be
    /// considered compromised.
    pub fn is_trust_violation(&self) -> bool {
        matches!(self, Self::TrustViolation(_))
    }
}

//! Per-operation option structs
//!
//! Every operation with knobs takes an explicit struct with enumerated
//! fields and documented defaults.

use serde::{Deserialize, Serialize};

/// Options for `Credentials::export`
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Elide fields that can be re-derived or re-fetched (wallet name,
    /// copayer name, public key ring)
    pub compressed: bool,
    /// Encrypt the serialized document with this password (Argon2id-stretched)
    pub password: Option<String>,
    /// Strip the request signing key: the import becomes a read-only /
    /// verification-only credential set (`can_sign()` == false)
    pub no_sign: bool,
}

/// Options for `WalletClient::get_tx_proposals`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetTxProposalsOptions {
    /// Skip proposal verification. Default false: any single forged proposal
    /// fails the whole batch.
    pub do_not_verify: bool,
    /// Return the air-gapped projection (still-encrypted proposals plus the
    /// key ring re-encrypted under the personal key) instead of the
    /// decrypted, verified list
    pub for_air_gapped: bool,
}

/// Options for `WalletClient::get_main_addresses`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetMainAddressesOptions {
    /// Skip address re-derivation. Default false: one mismatched address
    /// fails the whole batch.
    pub do_not_verify: bool,
}

/// Parameters for `WalletClient::send_tx_proposal`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendProposalOptions {
    pub to_address: String,
    pub amount: u64,
    /// Plaintext note; encrypted under the shared key before transmission
    pub message: Option<String>,
}

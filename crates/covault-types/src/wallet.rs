//! Server projections of wallet state
//!
//! Everything in this module is what the coordination service *claims*. The
//! client re-verifies anything security-relevant (copayer proofs, addresses)
//! before acting on it, and never caches these as authoritative.

use crate::{CopayerId, Network, WalletId};
use serde::{Deserialize, Serialize};

/// Server-reported wallet status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    /// Not all copayers have joined yet
    Pending,
    /// The public key ring is full
    Complete,
}

/// One copayer as reported by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Copayer {
    pub id: CopayerId,
    /// Hex-encoded public key
    #[serde(rename = "xPubKey")]
    pub public_key: String,
    /// Signature over the (name, public key) pair by the wallet-level key;
    /// this is the membership proof the verifier recomputes
    #[serde(rename = "xPubKeySignature")]
    pub public_key_signature: String,
    pub name: String,
}

/// Server projection of a shared wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub name: String,
    pub m: usize,
    pub n: usize,
    pub status: WalletStatus,
    pub network: Network,
    #[serde(default)]
    pub copayers: Vec<Copayer>,
}

/// A derived address as reported by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressInfo {
    pub address: String,
    /// Derivation index used to produce the address from the key ring
    pub path: u32,
}

/// Confirmed/pending balance projection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Balance {
    #[serde(rename = "totalAmount")]
    pub total_amount: u64,
    #[serde(rename = "lockedAmount")]
    pub locked_amount: u64,
}

/// Combined wallet status returned by `get_status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletStatusView {
    pub wallet: Wallet,
    pub pending_proposals: Vec<crate::TxProposal>,
    /// Invite secret, present only while the wallet is still pending and the
    /// local credentials hold the wallet-level private key
    pub secret: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_deserialize() {
        let json = r#"{
            "id": "w1", "name": "fam", "m": 2, "n": 3,
            "status": "pending", "network": "testnet",
            "copayers": [{"id": "c1", "xPubKey": "ab", "xPubKeySignature": "cd", "name": "alice"}]
        }"#;
        let w: Wallet = serde_json::from_str(json).unwrap();
        assert_eq!(w.status, WalletStatus::Pending);
        assert_eq!(w.copayers.len(), 1);
        assert_eq!(w.copayers[0].public_key, "ab");
    }

    #[test]
    fn test_wallet_copayers_default_empty() {
        let json = r#"{"id":"w1","name":"fam","m":1,"n":1,"status":"complete","network":"livenet"}"#;
        let w: Wallet = serde_json::from_str(json).unwrap();
        assert!(w.copayers.is_empty());
    }
}

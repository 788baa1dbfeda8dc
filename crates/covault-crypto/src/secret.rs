//! Invite secret encoding
//!
//! The secret is handed out-of-band to invited copayers. It carries exactly
//! the triple {walletId, wallet private key, network}: enough to join the
//! wallet and derive the shared encrypting key, nothing else.

use crate::{CryptoError, CryptoResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use covault_types::{Network, WalletId};
use serde::{Deserialize, Serialize};

/// Decoded invite secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(rename = "walletId")]
    pub wallet_id: WalletId,
    /// Hex-encoded wallet-level private key
    #[serde(rename = "walletPrivKey")]
    pub wallet_priv_key: String,
    pub network: Network,
}

/// Encode an invite secret as a base64url token.
pub fn encode_secret(wallet_id: &WalletId, wallet_priv_key: &str, network: Network) -> String {
    let secret = Secret {
        wallet_id: wallet_id.clone(),
        wallet_priv_key: wallet_priv_key.to_string(),
        network,
    };
    // Serialization of this fixed struct cannot fail
    let json = serde_json::to_string(&secret).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode an invite token back to the exact encoded triple.
pub fn decode_secret(token: &str) -> CryptoResult<Secret> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| CryptoError::InvalidSecret)?;
    serde_json::from_slice(&bytes).map_err(|_| CryptoError::InvalidSecret)
}

//! The credential set: identity keys, wallet-level keys, derived encrypting
//! keys, wallet metadata, and the public key ring.
//!
//! Single-writer discipline: only the orchestrator mutates a `Credentials`
//! value, and only after a successful, verified server round trip.
//! Concurrent wallet-mutating calls against the same credentials must be
//! serialized by the caller.

use covault_crypto as crypto;
use covault_crypto::KeyPair;
use covault_types::{CopayerId, Error, ExportOptions, Network, Result, WalletId};
use serde::{Deserialize, Serialize};

/// Wire document for credential export. Field names are part of the export
/// format.
#[derive(Debug, Serialize, Deserialize)]
struct ExportedCredentials {
    network: Network,
    #[serde(rename = "requestPrivKey", skip_serializing_if = "Option::is_none")]
    request_priv_key: Option<String>,
    #[serde(rename = "requestPubKey")]
    request_pub_key: String,
    #[serde(rename = "personalEncryptingKey")]
    personal_encrypting_key: String,
    #[serde(rename = "walletPrivKey", skip_serializing_if = "Option::is_none")]
    wallet_priv_key: Option<String>,
    #[serde(rename = "sharedEncryptingKey", skip_serializing_if = "Option::is_none")]
    shared_encrypting_key: Option<String>,
    #[serde(rename = "walletId", skip_serializing_if = "Option::is_none")]
    wallet_id: Option<WalletId>,
    #[serde(rename = "walletName", skip_serializing_if = "Option::is_none")]
    wallet_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    m: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<usize>,
    #[serde(rename = "copayerId", skip_serializing_if = "Option::is_none")]
    copayer_id: Option<CopayerId>,
    #[serde(rename = "copayerName", skip_serializing_if = "Option::is_none")]
    copayer_name: Option<String>,
    #[serde(rename = "publicKeyRing", default, skip_serializing_if = "Vec::is_empty")]
    public_key_ring: Vec<String>,
}

/// One client session's credential set.
#[derive(Debug, Clone)]
pub struct Credentials {
    network: Network,
    /// Hex signing key; absent for no-sign (air-gapped verification) imports
    request_priv_key: Option<String>,
    request_pub_key: String,
    /// Hex 32-byte symmetric key derived from the request key; never
    /// transmitted
    personal_encrypting_key: String,
    /// Hex wallet-level signing key; held only by the creator and invitees
    /// who received the invite secret
    wallet_priv_key: Option<String>,
    /// Hex 32-byte symmetric key derived from the wallet key; any legitimate
    /// copayer derives the same value without transmission
    shared_encrypting_key: Option<String>,
    wallet_id: Option<WalletId>,
    wallet_name: Option<String>,
    m: Option<usize>,
    n: Option<usize>,
    copayer_id: Option<CopayerId>,
    copayer_name: Option<String>,
    /// Copayer public keys, unique, at most n entries
    public_key_ring: Vec<String>,
}

impl Credentials {
    /// Seed fresh credentials: a new random identity key pair plus the
    /// personal encrypting key. No wallet is bound yet.
    pub fn create(network: Network) -> Self {
        let request_key = KeyPair::generate();
        Self::from_request_key(network, request_key, true)
    }

    /// Deterministic recovery path: derive the identity from an extended
    /// private key. `can_sign()` is true.
    pub fn from_extended_private_key(network: Network, xpriv: &str) -> Self {
        let request_key = crypto::derive_from_extended_key(xpriv);
        Self::from_request_key(network, request_key, true)
    }

    fn from_request_key(network: Network, request_key: KeyPair, keep_private: bool) -> Self {
        let personal =
            crypto::derive_encrypting_key(&request_key.private_key_bytes(), "personal");
        Self {
            network,
            request_priv_key: keep_private.then(|| request_key.private_key_hex()),
            request_pub_key: request_key.public_key_hex(),
            personal_encrypting_key: hex::encode(personal),
            wallet_priv_key: None,
            shared_encrypting_key: None,
            wallet_id: None,
            wallet_name: None,
            m: None,
            n: None,
            copayer_id: None,
            copayer_name: None,
            public_key_ring: Vec::new(),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Whether the signing private key is present. False for imported
    /// no-sign credentials.
    pub fn can_sign(&self) -> bool {
        self.request_priv_key.is_some()
    }

    /// Whether the wallet is fully known locally: metadata set and the ring
    /// holds all n keys. Monotonic: once true it never reverts.
    pub fn is_complete(&self) -> bool {
        self.wallet_id.is_some()
            && self.m.is_some()
            && matches!(self.n, Some(n) if self.public_key_ring.len() == n)
    }

    pub fn request_public_key(&self) -> &str {
        &self.request_pub_key
    }

    /// The request key pair, when the private half is present.
    pub fn request_key(&self) -> Result<KeyPair> {
        let priv_hex = self
            .request_priv_key
            .as_deref()
            .ok_or_else(|| Error::Validation("credentials cannot sign".into()))?;
        KeyPair::from_private_hex(priv_hex).map_err(Error::from)
    }

    pub fn wallet_private_key(&self) -> Option<&str> {
        self.wallet_priv_key.as_deref()
    }

    pub fn wallet_id(&self) -> Option<&WalletId> {
        self.wallet_id.as_ref()
    }

    pub fn wallet_name(&self) -> Option<&str> {
        self.wallet_name.as_deref()
    }

    pub fn m(&self) -> Option<usize> {
        self.m
    }

    pub fn n(&self) -> Option<usize> {
        self.n
    }

    pub fn copayer_id(&self) -> Option<&CopayerId> {
        self.copayer_id.as_ref()
    }

    pub fn copayer_name(&self) -> Option<&str> {
        self.copayer_name.as_deref()
    }

    pub fn public_key_ring(&self) -> &[String] {
        &self.public_key_ring
    }

    /// The personal encrypting key as raw bytes.
    pub fn personal_key(&self) -> Result<[u8; 32]> {
        decode_key_hex(&self.personal_encrypting_key)
    }

    /// The shared encrypting key as raw bytes, when wallet key material is
    /// known.
    pub fn shared_key(&self) -> Result<[u8; 32]> {
        let hex_key = self
            .shared_encrypting_key
            .as_deref()
            .ok_or_else(|| Error::Validation("shared encrypting key not available".into()))?;
        decode_key_hex(hex_key)
    }

    /// Bind wallet metadata, exactly once. When the wallet-level private key
    /// is supplied, the shared encrypting key is derived from it here.
    pub fn add_wallet_info(
        &mut self,
        wallet_id: WalletId,
        wallet_name: &str,
        m: usize,
        n: usize,
        wallet_priv_key: Option<String>,
        copayer_name: &str,
    ) -> Result<()> {
        if self.wallet_id.is_some() {
            return Err(Error::Validation(
                "credentials are already bound to a wallet".into(),
            ));
        }
        if m == 0 || m > n {
            return Err(Error::Validation(format!("invalid quorum {m}-of-{n}")));
        }

        if let Some(ref priv_hex) = wallet_priv_key {
            let wallet_key = KeyPair::from_private_hex(priv_hex)?;
            let shared =
                crypto::derive_encrypting_key(&wallet_key.private_key_bytes(), "shared");
            self.shared_encrypting_key = Some(hex::encode(shared));
        }

        self.wallet_id = Some(wallet_id);
        self.wallet_name = Some(wallet_name.to_string());
        self.m = Some(m);
        self.n = Some(n);
        self.wallet_priv_key = wallet_priv_key;
        self.copayer_id = Some(CopayerId::new(crypto::copayer_id(&self.request_pub_key)));
        self.copayer_name = Some(copayer_name.to_string());
        Ok(())
    }

    /// Merge public keys into the ring, ignoring duplicates. The ring never
    /// grows past n; once it reaches n, `is_complete()` is permanently true.
    pub fn add_public_key_ring(&mut self, keys: &[String]) -> Result<()> {
        let n = self
            .n
            .ok_or_else(|| Error::Validation("wallet info not set".into()))?;
        for key in keys {
            if self.public_key_ring.contains(key) {
                continue;
            }
            if self.public_key_ring.len() == n {
                return Err(Error::Validation(
                    "public key ring already holds n keys".into(),
                ));
            }
            self.public_key_ring.push(key.clone());
        }
        Ok(())
    }

    /// Adopt a re-registered wallet id after a successful recreate.
    pub(crate) fn set_wallet_id(&mut self, wallet_id: WalletId) {
        self.wallet_id = Some(wallet_id);
    }

    /// Install quorum and ring transported to an air-gapped signer. Used
    /// only by the offline signing path, which validates the ring length
    /// before calling this.
    pub fn install_quorum(&mut self, m: usize, n: usize, ring: Vec<String>) {
        self.m = Some(m);
        self.n = Some(n);
        self.public_key_ring = ring;
        if self.copayer_id.is_none() {
            self.copayer_id = Some(CopayerId::new(crypto::copayer_id(&self.request_pub_key)));
        }
    }

    /// Serialize for storage. `no_sign` strips the signing key, `compressed`
    /// elides re-fetchable fields, `password` encrypts the document at rest.
    pub fn export(&self, opts: &ExportOptions) -> Result<String> {
        let doc = ExportedCredentials {
            network: self.network,
            request_priv_key: if opts.no_sign {
                None
            } else {
                self.request_priv_key.clone()
            },
            request_pub_key: self.request_pub_key.clone(),
            personal_encrypting_key: self.personal_encrypting_key.clone(),
            wallet_priv_key: self.wallet_priv_key.clone(),
            shared_encrypting_key: self.shared_encrypting_key.clone(),
            wallet_id: self.wallet_id.clone(),
            wallet_name: if opts.compressed {
                None
            } else {
                self.wallet_name.clone()
            },
            m: self.m,
            n: self.n,
            copayer_id: self.copayer_id.clone(),
            copayer_name: if opts.compressed {
                None
            } else {
                self.copayer_name.clone()
            },
            public_key_ring: if opts.compressed {
                Vec::new()
            } else {
                self.public_key_ring.clone()
            },
        };

        let json = serde_json::to_string(&doc)
            .map_err(|e| Error::Validation(format!("export serialization failed: {e}")))?;

        match &opts.password {
            Some(password) => crypto::encrypt_with_password(&json, password)
                .map_err(|e| Error::Validation(e.to_string())),
            None => Ok(json),
        }
    }

    /// Reverse of `export`. Constructs a fresh value: a failed import never
    /// mutates any existing credentials the caller holds.
    ///
    /// Wrong password fails with [`Error::IncorrectPassword`]; a payload
    /// that does not parse fails with [`Error::ImportFailed`].
    pub fn import(data: &str, password: Option<&str>) -> Result<Self> {
        let json = match password {
            Some(pw) => match crypto::decrypt_with_password(data, pw) {
                Ok(json) => json,
                Err(covault_crypto::CryptoError::Decryption(msg))
                    if msg.contains("authentication") =>
                {
                    return Err(Error::IncorrectPassword)
                }
                Err(e) => return Err(Error::ImportFailed(e.to_string())),
            },
            None => data.to_string(),
        };

        let doc: ExportedCredentials =
            serde_json::from_str(&json).map_err(|e| Error::ImportFailed(e.to_string()))?;

        // Reject documents whose keys are internally inconsistent
        if let Some(ref priv_hex) = doc.request_priv_key {
            let pair = KeyPair::from_private_hex(priv_hex)
                .map_err(|e| Error::ImportFailed(e.to_string()))?;
            if pair.public_key_hex() != doc.request_pub_key {
                return Err(Error::ImportFailed(
                    "request key pair mismatch".into(),
                ));
            }
        }

        Ok(Self {
            network: doc.network,
            request_priv_key: doc.request_priv_key,
            request_pub_key: doc.request_pub_key,
            personal_encrypting_key: doc.personal_encrypting_key,
            wallet_priv_key: doc.wallet_priv_key,
            shared_encrypting_key: doc.shared_encrypting_key,
            wallet_id: doc.wallet_id,
            wallet_name: doc.wallet_name,
            m: doc.m,
            n: doc.n,
            copayer_id: doc.copayer_id,
            copayer_name: doc.copayer_name,
            public_key_ring: doc.public_key_ring,
        })
    }
}

fn decode_key_hex(hex_key: &str) -> Result<[u8; 32]> {
    let bytes =
        hex::decode(hex_key).map_err(|e| Error::Validation(format!("bad key hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| Error::Validation("encrypting key must be 32 bytes".into()))
}

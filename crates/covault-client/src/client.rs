//! The wallet protocol orchestrator
//!
//! `WalletClient` sequences every wallet and proposal operation. It is the
//! sole caller of the transport and the sole mutator of the credential set,
//! and it hands every server response to the verifier before trusting it.
//!
//! Client-observed state machine, monotonic with no back-transitions:
//!
//! ```text
//! NoCredentials -> Seeded -> WalletInfoKnown(pending) -> Complete
//! ```

use crate::auth;
use crate::credentials::Credentials;
use crate::events::{Notification, Notifier};
use crate::transport::{parse_error_body, HttpTransport, RequestHeaders, Transport};
use crate::verifier;
use covault_crypto as crypto;
use covault_crypto::KeyPair;
use covault_types::{
    AddressInfo, AirGappedBundle, Balance, Error, GetMainAddressesOptions,
    GetTxProposalsOptions, HistoryItem, Network, ProposalId, Result, SendProposalOptions,
    TxProposal, Wallet, WalletId, WalletStatus, WalletStatusView,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Placeholder shown when a message body cannot be decrypted. Message
/// content is best-effort; a garbled note must not abort the operation.
pub const CANNOT_DECRYPT_PLACEHOLDER: &str = "<ECANNOTDECRYPT>";

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Coordination service base URL
    pub base_url: String,
    /// Request timeout, applied by the transport
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3232/covault/api".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client-observed wallet state, derived from the credential set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletState {
    NoCredentials,
    Seeded,
    WalletInfoKnown,
    Complete,
}

/// Result of [`WalletClient::get_tx_proposals`]: either the decrypted,
/// verified list, or the offline projection for an air-gapped signer.
#[derive(Debug, Clone)]
pub enum TxProposalsView {
    Decrypted(Vec<TxProposal>),
    AirGapped(AirGappedBundle),
}

// ============================================================================
// Wire bodies
// ============================================================================

#[derive(Serialize)]
struct RegisterWalletRequest<'a> {
    name: &'a str,
    m: usize,
    n: usize,
    #[serde(rename = "pubKey")]
    pub_key: String,
    network: Network,
}

#[derive(Deserialize)]
struct RegisterWalletResponse {
    #[serde(rename = "walletId")]
    wallet_id: WalletId,
}

#[derive(Serialize)]
struct JoinWalletRequest<'a> {
    #[serde(rename = "walletId")]
    wallet_id: &'a str,
    name: &'a str,
    #[serde(rename = "xPubKey")]
    x_pub_key: &'a str,
    #[serde(rename = "xPubKeySignature")]
    x_pub_key_signature: String,
}

#[derive(Deserialize)]
struct WalletEnvelope {
    wallet: Wallet,
}

#[derive(Serialize)]
struct SendProposalRequest<'a> {
    #[serde(rename = "toAddress")]
    to_address: &'a str,
    amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(rename = "proposalSignature")]
    proposal_signature: String,
}

#[derive(Serialize)]
struct PushSignaturesRequest {
    signatures: Vec<String>,
}

#[derive(Serialize)]
struct RejectProposalRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// The wallet protocol orchestrator.
///
/// All operations take `&mut self`: the credential set follows a documented
/// single-writer discipline, and concurrent wallet-mutating calls against
/// the same client must be serialized by the caller.
pub struct WalletClient {
    config: Config,
    transport: Arc<dyn Transport>,
    credentials: Option<Credentials>,
    notifier: Notifier,
}

impl WalletClient {
    /// Create a client backed by the HTTP transport.
    pub fn new(config: Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.timeout)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client with an injected transport (tests, alternate stacks).
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            credentials: None,
            notifier: Notifier::default(),
        }
    }

    /// Register an observer for protocol notifications.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Notification> {
        self.notifier.subscribe()
    }

    /// The client-observed wallet state.
    pub fn state(&self) -> WalletState {
        match &self.credentials {
            None => WalletState::NoCredentials,
            Some(c) if c.is_complete() => WalletState::Complete,
            Some(c) if c.wallet_id().is_some() => WalletState::WalletInfoKnown,
            Some(_) => WalletState::Seeded,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Install credentials, e.g. after an import or a recovery derivation.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Seed fresh credentials from an extended private key (recovery path).
    pub fn seed_from_extended_private_key(&mut self, network: Network, xpriv: &str) {
        self.credentials = Some(Credentials::from_extended_private_key(network, xpriv));
    }

    // ------------------------------------------------------------------
    // Wallet lifecycle
    // ------------------------------------------------------------------

    /// Create an m-of-n wallet and self-join as the first copayer.
    ///
    /// Seeds credentials if absent; fails if an existing seed's network
    /// differs. Returns the invite secret to hand to the other copayers,
    /// or `None` for a 1-of-1 wallet.
    pub async fn create_wallet(
        &mut self,
        wallet_name: &str,
        copayer_name: &str,
        m: usize,
        n: usize,
        network: Network,
    ) -> Result<Option<String>> {
        if m == 0 || m > n {
            return Err(Error::Validation(format!("invalid quorum {m}-of-{n}")));
        }
        self.ensure_seeded(network)?;

        let wallet_key = KeyPair::generate();
        let wallet_priv = wallet_key.private_key_hex();

        let body = to_body(&RegisterWalletRequest {
            name: wallet_name,
            m,
            n,
            pub_key: wallet_key.public_key_hex(),
            network,
        })?;
        // bootstrap: no copayer identity exists yet, sent unsigned
        let value = self.request("post", "/v1/wallets/", Some(body), false).await?;
        let resp: RegisterWalletResponse = from_value(value)?;

        self.creds_mut()?.add_wallet_info(
            resp.wallet_id.clone(),
            wallet_name,
            m,
            n,
            Some(wallet_priv.clone()),
            copayer_name,
        )?;

        let own_key = self.creds()?.request_public_key().to_string();
        self.join_copayer(&resp.wallet_id, &wallet_key, copayer_name, &own_key)
            .await?;
        // only our own key enters the ring here; the rest is merged by
        // open_wallet after the copayer proofs verify
        self.creds_mut()?.add_public_key_ring(&[own_key])?;

        tracing::info!(wallet = %resp.wallet_id, %m, %n, "wallet created");
        Ok((n > 1).then(|| crypto::encode_secret(&resp.wallet_id, &wallet_priv, network)))
    }

    /// Join a wallet from an invite secret received out-of-band.
    pub async fn join_wallet(&mut self, secret: &str, copayer_name: &str) -> Result<Wallet> {
        let secret = crypto::decode_secret(secret)?;
        self.ensure_seeded(secret.network)?;

        // invitee path: the wallet key comes from the secret, never
        // self-generated
        let wallet_key = KeyPair::from_private_hex(&secret.wallet_priv_key)?;
        let own_key = self.creds()?.request_public_key().to_string();
        let wallet = self
            .join_copayer(&secret.wallet_id, &wallet_key, copayer_name, &own_key)
            .await?;

        self.creds_mut()?.add_wallet_info(
            secret.wallet_id,
            &wallet.name,
            wallet.m,
            wallet.n,
            Some(secret.wallet_priv_key),
            copayer_name,
        )?;
        // the server-reported co-members are unverified at this point; the
        // ring holds only our own key until open_wallet checks the proofs
        self.creds_mut()?.add_public_key_ring(&[own_key])?;

        tracing::info!(wallet = %wallet.id, "joined wallet");
        Ok(wallet)
    }

    /// Recovery: re-register the wallet and re-join once per ring entry, in
    /// ring order. Self joins under its real name; every other entry gets a
    /// placeholder. The whole operation aborts on the first join failure,
    /// with no local mutation beyond what the server already accepted.
    pub async fn recreate_wallet(&mut self) -> Result<()> {
        let creds = self.creds()?;
        let wallet_priv = creds
            .wallet_private_key()
            .ok_or_else(|| Error::Validation("wallet private key required to recreate".into()))?
            .to_string();
        let (wallet_name, m, n) = match (creds.wallet_name(), creds.m(), creds.n()) {
            (Some(name), Some(m), Some(n)) => (name.to_string(), m, n),
            _ => return Err(Error::Validation("wallet info not set".into())),
        };
        if creds.public_key_ring().is_empty() {
            return Err(Error::Validation("public key ring is empty".into()));
        }
        let network = creds.network();
        let own_key = creds.request_public_key().to_string();
        let own_name = creds.copayer_name().unwrap_or("copayer").to_string();
        let ring: Vec<String> = creds.public_key_ring().to_vec();

        let wallet_key = KeyPair::from_private_hex(&wallet_priv)?;
        let body = to_body(&RegisterWalletRequest {
            name: &wallet_name,
            m,
            n,
            pub_key: wallet_key.public_key_hex(),
            network,
        })?;
        let value = self.request("post", "/v1/wallets/", Some(body), false).await?;
        let resp: RegisterWalletResponse = from_value(value)?;

        for (k, ring_key) in ring.iter().enumerate() {
            let name = if *ring_key == own_key {
                own_name.clone()
            } else {
                format!("recovered copayer #{}", k + 1)
            };
            // fail-fast: the first join error aborts the remaining joins
            self.join_copayer(&resp.wallet_id, &wallet_key, &name, ring_key)
                .await?;
        }

        // adopt the re-registered id only after every join succeeded
        self.creds_mut()?.set_wallet_id(resp.wallet_id.clone());
        tracing::info!(wallet = %resp.wallet_id, "wallet recreated");
        Ok(())
    }

    /// Fetch the wallet projection and reconcile local state. Returns
    /// whether local state was completed by this call; persistence is the
    /// caller's concern.
    pub async fn open_wallet(&mut self) -> Result<bool> {
        let was_complete = self.creds()?.is_complete();

        let value = self.request("get", "/v1/wallets/", None, true).await?;
        let envelope: WalletEnvelope = from_value(value)?;
        let wallet = envelope.wallet;

        // first contact after an import: populate wallet info by matching
        // our own copayer id in the server response
        if self.creds()?.wallet_id().is_none() {
            let my_id = crypto::copayer_id(self.creds()?.request_public_key());
            let me = wallet
                .copayers
                .iter()
                .find(|c| c.id.as_str() == my_id)
                .ok_or_else(|| {
                    Error::Validation("local copayer is not a member of this wallet".into())
                })?;
            let my_name = me.name.clone();
            self.creds_mut()?.add_wallet_info(
                wallet.id.clone(),
                &wallet.name,
                wallet.m,
                wallet.n,
                None,
                &my_name,
            )?;
        }

        if self.creds()?.wallet_private_key().is_some() {
            verifier::check_copayers(self.creds()?, &wallet.copayers)?;
        } else {
            tracing::warn!(
                wallet = %wallet.id,
                "wallet private key not available; copayer proofs are unverifiable"
            );
        }

        // the local Complete transition is gated on the server-reported
        // status, not on ring size alone
        if wallet.status == WalletStatus::Complete {
            self.merge_ring(&wallet)?;
        }

        let just_completed = !was_complete
            && wallet.status == WalletStatus::Complete
            && self.creds()?.is_complete();
        if just_completed {
            self.notifier.notify(Notification::WalletCompleted);
        }
        Ok(just_completed)
    }

    /// Fetch wallet plus pending proposals. While the wallet is pending and
    /// the wallet key is held locally, the invite secret is recomputed and
    /// attached. Proposal messages are decrypted in place.
    pub async fn get_status(&mut self) -> Result<WalletStatusView> {
        let value = self.request("get", "/v1/wallets/", None, true).await?;
        let envelope: WalletEnvelope = from_value(value)?;
        let wallet = envelope.wallet;

        let value = self.request("get", "/v1/txproposals/", None, true).await?;
        let mut proposals: Vec<TxProposal> = from_value(value)?;
        for txp in &mut proposals {
            self.decrypt_proposal_in_place(txp);
        }

        let creds = self.creds()?;
        let secret = match (wallet.status, creds.wallet_private_key()) {
            (WalletStatus::Pending, Some(priv_key)) => {
                let wallet_id = creds.wallet_id().unwrap_or(&wallet.id);
                Some(crypto::encode_secret(wallet_id, priv_key, creds.network()))
            }
            _ => None,
        };

        Ok(WalletStatusView {
            wallet,
            pending_proposals: proposals,
            secret,
        })
    }

    // ------------------------------------------------------------------
    // Addresses and balance
    // ------------------------------------------------------------------

    /// Request a fresh address and verify it against the local derivation.
    pub async fn create_address(&mut self) -> Result<AddressInfo> {
        self.require_complete()?;
        let value = self
            .request("post", "/v1/addresses/", Some(auth::EMPTY_BODY.into()), true)
            .await?;
        let address: AddressInfo = from_value(value)?;
        verifier::check_address(self.creds()?, &address)?;
        Ok(address)
    }

    /// Fetch all main addresses. Fails closed on the first mismatch unless
    /// verification is explicitly skipped.
    pub async fn get_main_addresses(
        &mut self,
        opts: GetMainAddressesOptions,
    ) -> Result<Vec<AddressInfo>> {
        self.require_complete()?;
        let value = self.request("get", "/v1/addresses/", None, true).await?;
        let addresses: Vec<AddressInfo> = from_value(value)?;
        if !opts.do_not_verify {
            for address in &addresses {
                verifier::check_address(self.creds()?, address)?;
            }
        }
        Ok(addresses)
    }

    pub async fn get_balance(&mut self) -> Result<Balance> {
        self.require_complete()?;
        let value = self.request("get", "/v1/balance/", None, true).await?;
        from_value(value)
    }

    // ------------------------------------------------------------------
    // Proposal lifecycle
    // ------------------------------------------------------------------

    /// Create a spend proposal: encrypt the message, hash and sign locally,
    /// submit.
    pub async fn send_tx_proposal(&mut self, opts: SendProposalOptions) -> Result<TxProposal> {
        self.require_complete()?;
        let creds = self.creds()?;

        let encrypted_message = match &opts.message {
            Some(message) => {
                let shared = creds.shared_key()?;
                Some(crypto::encrypt_message(message, &shared)?)
            }
            None => None,
        };

        let hash =
            crypto::proposal_hash(&opts.to_address, opts.amount, encrypted_message.as_deref());
        let proposal_signature = creds.request_key()?.sign(&hash)?;

        let body = to_body(&SendProposalRequest {
            to_address: &opts.to_address,
            amount: opts.amount,
            message: encrypted_message,
            proposal_signature,
        })?;
        let value = self.request("post", "/v1/txproposals/", Some(body), true).await?;
        let mut txp: TxProposal = from_value(value)?;
        self.decrypt_proposal_in_place(&mut txp);

        self.notifier.notify(Notification::ProposalCreated(txp.id.clone()));
        Ok(txp)
    }

    /// Fetch pending proposals.
    ///
    /// Default mode verifies every proposal (one forgery fails the whole
    /// batch) and decrypts messages in place. The air-gapped mode instead
    /// returns the still-encrypted proposals with the key ring re-encrypted
    /// under the personal key, for offline transport to a signer.
    pub async fn get_tx_proposals(
        &mut self,
        opts: GetTxProposalsOptions,
    ) -> Result<TxProposalsView> {
        self.require_complete()?;
        let value = self.request("get", "/v1/txproposals/", None, true).await?;
        let mut proposals: Vec<TxProposal> = from_value(value)?;

        if !opts.do_not_verify {
            for txp in &proposals {
                verifier::check_tx_proposal(self.creds()?, txp)?;
            }
        }

        if opts.for_air_gapped {
            let creds = self.creds()?;
            let ring_json = serde_json::to_string(creds.public_key_ring())
                .map_err(|e| Error::Validation(e.to_string()))?;
            let encrypted_ring = crypto::encrypt_message(&ring_json, &creds.personal_key()?)?;
            return Ok(TxProposalsView::AirGapped(AirGappedBundle {
                proposals,
                encrypted_ring,
                m: creds.m().unwrap_or_default(),
                n: creds.n().unwrap_or_default(),
            }));
        }

        for txp in &mut proposals {
            self.decrypt_proposal_in_place(txp);
        }
        Ok(TxProposalsView::Decrypted(proposals))
    }

    /// Compute this copayer's signatures for a proposal. The proposal is
    /// re-verified first; unverified data is never signed.
    pub fn get_signatures(&self, txp: &TxProposal) -> Result<Vec<String>> {
        let creds = self.require_complete()?;
        if !creds.can_sign() {
            return Err(Error::Validation("credentials cannot sign".into()));
        }
        verifier::check_tx_proposal(creds, txp)?;

        let hash =
            crypto::proposal_hash(&txp.to_address, txp.amount, txp.encrypted_message.as_deref());
        crypto::sign_proposal(&hash, &creds.request_key()?).map_err(Into::into)
    }

    /// Sign a proposal and push the signatures to the server.
    pub async fn sign_tx_proposal(&mut self, txp: &TxProposal) -> Result<TxProposal> {
        let signatures = self.get_signatures(txp)?;
        let body = to_body(&PushSignaturesRequest { signatures })?;
        let path = format!("/v1/txproposals/{}/signatures/", txp.id);
        let value = self.request("post", &path, Some(body), true).await?;
        let mut updated: TxProposal = from_value(value)?;
        self.decrypt_proposal_in_place(&mut updated);

        self.notifier.notify(Notification::ProposalSigned(updated.id.clone()));
        Ok(updated)
    }

    /// Offline signing from an air-gapped bundle. Decrypts the transported
    /// ring with the personal key, validates its length against n, installs
    /// quorum and ring, then verifies and signs. No network access; the
    /// output is solely the computed signatures.
    pub fn sign_tx_proposal_from_air_gapped(
        &mut self,
        txp: &TxProposal,
        encrypted_ring: &str,
        m: usize,
        n: usize,
    ) -> Result<Vec<String>> {
        let creds = self.creds()?;
        if !creds.can_sign() {
            return Err(Error::Validation("credentials cannot sign".into()));
        }
        let personal = creds.personal_key()?;

        // a bad or foreign payload is fatal here, unlike message bodies
        let ring_json = crypto::decrypt_message(encrypted_ring, &personal)
            .map_err(|e| Error::Decryption(e.to_string()))?;
        let ring: Vec<String> = serde_json::from_str(&ring_json)
            .map_err(|e| Error::Decryption(format!("ring payload malformed: {e}")))?;

        // validated before any credential mutation
        if ring.len() != n {
            return Err(Error::InvalidPublicKeyRing {
                expected: n,
                actual: ring.len(),
            });
        }

        self.creds_mut()?.install_quorum(m, n, ring);
        let creds = self.creds()?;
        verifier::check_tx_proposal(creds, txp)?;

        let hash =
            crypto::proposal_hash(&txp.to_address, txp.amount, txp.encrypted_message.as_deref());
        crypto::sign_proposal(&hash, &creds.request_key()?).map_err(Into::into)
    }

    /// Reject a proposal, with an optional reason encrypted like any other
    /// message body.
    pub async fn reject_tx_proposal(
        &mut self,
        txp: &TxProposal,
        reason: Option<&str>,
    ) -> Result<TxProposal> {
        self.require_complete()?;
        let encrypted_reason = match reason {
            Some(reason) => {
                let shared = self.creds()?.shared_key()?;
                Some(crypto::encrypt_message(reason, &shared)?)
            }
            None => None,
        };

        let body = to_body(&RejectProposalRequest {
            reason: encrypted_reason,
        })?;
        let path = format!("/v1/txproposals/{}/rejections/", txp.id);
        let value = self.request("post", &path, Some(body), true).await?;
        let mut updated: TxProposal = from_value(value)?;
        self.decrypt_proposal_in_place(&mut updated);

        self.notifier.notify(Notification::ProposalRejected(updated.id.clone()));
        Ok(updated)
    }

    /// Broadcast a fully signed proposal.
    pub async fn broadcast_tx_proposal(&mut self, txp: &TxProposal) -> Result<TxProposal> {
        self.require_complete()?;
        let path = format!("/v1/txproposals/{}/broadcast/", txp.id);
        let value = self
            .request("post", &path, Some(auth::EMPTY_BODY.into()), true)
            .await?;
        let mut updated: TxProposal = from_value(value)?;
        self.decrypt_proposal_in_place(&mut updated);

        self.notifier.notify(Notification::ProposalBroadcast(updated.id.clone()));
        Ok(updated)
    }

    /// Delete a proposal this copayer created.
    pub async fn remove_tx_proposal(&mut self, proposal_id: &ProposalId) -> Result<()> {
        self.require_complete()?;
        let path = format!("/v1/txproposals/{proposal_id}");
        self.request("delete", &path, None, true).await?;

        self.notifier.notify(Notification::ProposalRemoved(proposal_id.clone()));
        Ok(())
    }

    /// Fetch confirmed transaction history, decrypting notes best-effort.
    pub async fn get_tx_history(&mut self) -> Result<Vec<HistoryItem>> {
        self.require_complete()?;
        let value = self.request("get", "/v1/txhistory/", None, true).await?;
        let mut items: Vec<HistoryItem> = from_value(value)?;

        let shared = self.creds()?.shared_key().ok();
        for item in &mut items {
            if let Some(encrypted) = &item.encrypted_message {
                item.decrypted_message = Some(decrypt_or_placeholder(encrypted, shared.as_ref()));
            }
        }
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn creds(&self) -> Result<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| Error::Validation("no credentials".into()))
    }

    fn creds_mut(&mut self) -> Result<&mut Credentials> {
        self.credentials
            .as_mut()
            .ok_or_else(|| Error::Validation("no credentials".into()))
    }

    fn require_complete(&self) -> Result<&Credentials> {
        let creds = self.creds()?;
        if !creds.is_complete() {
            return Err(Error::Validation("credentials are not complete".into()));
        }
        Ok(creds)
    }

    fn ensure_seeded(&mut self, network: Network) -> Result<()> {
        match &self.credentials {
            None => {
                self.credentials = Some(Credentials::create(network));
                Ok(())
            }
            Some(creds) if creds.network() == network => Ok(()),
            Some(creds) => Err(Error::Validation(format!(
                "credentials are bound to {}, not {network}",
                creds.network()
            ))),
        }
    }

    /// Register one copayer (public key `x_pub_key`) with a wallet, proving
    /// the invitation with the wallet-level key.
    async fn join_copayer(
        &mut self,
        wallet_id: &WalletId,
        wallet_key: &KeyPair,
        name: &str,
        x_pub_key: &str,
    ) -> Result<Wallet> {
        let digest = crypto::copayer_proof_digest(name, x_pub_key);
        let signature = wallet_key.sign(&digest)?;
        let body = to_body(&JoinWalletRequest {
            wallet_id: wallet_id.as_str(),
            name,
            x_pub_key,
            x_pub_key_signature: signature,
        })?;

        let path = format!("/v1/wallets/{wallet_id}/copayers");
        let value = self.request("post", &path, Some(body), false).await?;
        let envelope: WalletEnvelope = from_value(value)?;
        Ok(envelope.wallet)
    }

    fn merge_ring(&mut self, wallet: &Wallet) -> Result<()> {
        let keys: Vec<String> = wallet
            .copayers
            .iter()
            .map(|c| c.public_key.clone())
            .collect();
        self.creds_mut()?.add_public_key_ring(&keys)
    }

    fn decrypt_proposal_in_place(&self, txp: &mut TxProposal) {
        let shared = match self.creds() {
            Ok(creds) => creds.shared_key().ok(),
            Err(_) => None,
        };
        if let Some(encrypted) = &txp.encrypted_message {
            txp.decrypted_message = Some(decrypt_or_placeholder(encrypted, shared.as_ref()));
        }
        for action in &mut txp.actions {
            if let Some(encrypted) = &action.encrypted_comment {
                action.comment = Some(decrypt_or_placeholder(encrypted, shared.as_ref()));
            }
        }
    }

    /// Single choke point for network calls: serialize once, sign the exact
    /// transmitted bytes, execute, map non-200 to a structured error.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
        signed: bool,
    ) -> Result<serde_json::Value> {
        let mut headers = RequestHeaders::default();
        if signed {
            let creds = self.creds()?;
            let key = creds.request_key()?;
            let body_str = body.as_deref().unwrap_or(auth::EMPTY_BODY);
            headers.signature = Some(auth::sign_request(method, path, body_str, &key)?);
            // the canonical derivation, valid before wallet info is bound
            headers.identity = Some(crypto::copayer_id(creds.request_public_key()));
        }

        let url = format!("{}{}", self.config.base_url, path);
        let (status, text) = self.transport.execute(method, &url, headers, body).await?;
        if status != 200 {
            return Err(parse_error_body(status, &text));
        }
        if text.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| Error::Server {
            code: "BAD_RESPONSE".to_string(),
            message: format!("unparseable response body: {e}"),
        })
    }
}

fn to_body<T: Serialize>(req: &T) -> Result<String> {
    serde_json::to_string(req).map_err(|e| Error::Validation(format!("serialization failed: {e}")))
}

fn from_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::Server {
        code: "BAD_RESPONSE".to_string(),
        message: format!("unexpected response shape: {e}"),
    })
}

fn decrypt_or_placeholder(encrypted: &str, shared: Option<&[u8; 32]>) -> String {
    shared
        .and_then(|key| crypto::decrypt_message(encrypted, key).ok())
        .unwrap_or_else(|| CANNOT_DECRYPT_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.base_url.starts_with("http://localhost"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_state_progression() {
        struct NoopTransport;
        #[async_trait::async_trait]
        impl Transport for NoopTransport {
            async fn execute(
                &self,
                _method: &str,
                _url: &str,
                _headers: RequestHeaders,
                _body: Option<String>,
            ) -> Result<(u16, String)> {
                Err(Error::Transport("offline".into()))
            }
        }

        let mut client = WalletClient::with_transport(Config::default(), Arc::new(NoopTransport));
        assert_eq!(client.state(), WalletState::NoCredentials);

        client.set_credentials(Credentials::create(Network::Testnet));
        assert_eq!(client.state(), WalletState::Seeded);

        let wallet_key = KeyPair::generate();
        client
            .creds_mut()
            .unwrap()
            .add_wallet_info(
                WalletId::new("w1"),
                "fam",
                1,
                2,
                Some(wallet_key.private_key_hex()),
                "alice",
            )
            .unwrap();
        assert_eq!(client.state(), WalletState::WalletInfoKnown);

        let own = client.creds().unwrap().request_public_key().to_string();
        client
            .creds_mut()
            .unwrap()
            .add_public_key_ring(&[own, "other-key".into()])
            .unwrap();
        assert_eq!(client.state(), WalletState::Complete);
    }

    #[test]
    fn test_network_mismatch_on_reseed() {
        struct NoopTransport;
        #[async_trait::async_trait]
        impl Transport for NoopTransport {
            async fn execute(
                &self,
                _method: &str,
                _url: &str,
                _headers: RequestHeaders,
                _body: Option<String>,
            ) -> Result<(u16, String)> {
                Err(Error::Transport("offline".into()))
            }
        }

        let mut client = WalletClient::with_transport(Config::default(), Arc::new(NoopTransport));
        client.set_credentials(Credentials::create(Network::Livenet));
        assert!(matches!(
            client.ensure_seeded(Network::Testnet),
            Err(Error::Validation(_))
        ));
        // matching network is accepted and does not reseed
        let before = client.creds().unwrap().request_public_key().to_string();
        client.ensure_seeded(Network::Livenet).unwrap();
        assert_eq!(client.creds().unwrap().request_public_key(), before);
    }
}

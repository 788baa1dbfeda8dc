//! Transaction proposal projections
//!
//! A proposal's `message` travels encrypted under the shared wallet key; the
//! decrypted view is populated client-side and never sent back.

use crate::{CopayerId, ProposalId};
use serde::{Deserialize, Serialize};

/// Lifecycle of a spend proposal as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Broadcasted,
    Rejected,
}

/// What a copayer did about a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Accept,
    Reject,
}

/// One copayer's recorded action on a proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalAction {
    #[serde(rename = "copayerId")]
    pub copayer_id: CopayerId,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Optional comment, encrypted under the shared key on the wire
    #[serde(default, rename = "comment")]
    pub encrypted_comment: Option<String>,
    /// Decrypted comment, populated client-side
    #[serde(skip)]
    pub comment: Option<String>,
}

/// A spend proposal as reported by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxProposal {
    pub id: ProposalId,
    #[serde(rename = "creatorId")]
    pub creator_id: CopayerId,
    #[serde(rename = "toAddress")]
    pub to_address: String,
    pub amount: u64,
    /// Wire form of the message, encrypted under the shared key
    #[serde(rename = "message")]
    pub encrypted_message: Option<String>,
    /// Decrypted view, populated client-side before a proposal is returned
    /// to the caller; never serialized back to the server
    #[serde(skip)]
    pub decrypted_message: Option<String>,
    /// Creator's signature over the proposal hash
    #[serde(rename = "proposalSignature")]
    pub proposal_signature: String,
    pub status: ProposalStatus,
    #[serde(default)]
    pub actions: Vec<ProposalAction>,
    /// Signatures collected so far, keyed by copayer
    #[serde(default)]
    pub signatures: Vec<CopayerSignatures>,
}

/// Signatures contributed by one copayer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopayerSignatures {
    #[serde(rename = "copayerId")]
    pub copayer_id: CopayerId,
    pub signatures: Vec<String>,
}

/// A confirmed transaction in the wallet's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub txid: String,
    pub amount: u64,
    pub fees: u64,
    pub time: u64,
    #[serde(default, rename = "message")]
    pub encrypted_message: Option<String>,
    #[serde(skip)]
    pub decrypted_message: Option<String>,
}

/// Offline projection of pending proposals for an air-gapped signer.
///
/// `encrypted_ring` is the JSON public key ring encrypted under the
/// *personal* encrypting key, so only the owning copayer's offline device
/// can open it; proposal messages stay in their shared-key wire form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirGappedBundle {
    pub proposals: Vec<TxProposal>,
    #[serde(rename = "encryptedPkr")]
    pub encrypted_ring: String,
    pub m: usize,
    pub n: usize,
}

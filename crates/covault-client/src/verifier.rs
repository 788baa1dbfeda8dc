//! The trust boundary: pure predicates that re-derive expected artifacts
//! from local key material and compare against what the server supplied.
//!
//! Nothing here trusts a server-declared validity flag, and a failed check
//! is a [`Error::TrustViolation`], distinct from ordinary errors so callers
//! can alert the user instead of retrying.

use crate::credentials::Credentials;
use covault_crypto as crypto;
use covault_crypto::KeyPair;
use covault_types::{AddressInfo, Copayer, Error, Result, TrustFailure, TxProposal};

/// Recompute each claimed copayer's membership proof from the locally-held
/// wallet-level private key and compare.
///
/// Only meaningful when that key is present locally; callers without it log
/// the copayers as unverifiable instead of calling this.
pub fn check_copayers(credentials: &Credentials, copayers: &[Copayer]) -> Result<()> {
    let wallet_priv = credentials
        .wallet_private_key()
        .ok_or_else(|| Error::Validation("wallet private key not available".into()))?;
    let wallet_pub = KeyPair::from_private_hex(wallet_priv)?.public_key_hex();

    for copayer in copayers {
        let digest = crypto::copayer_proof_digest(&copayer.name, &copayer.public_key);
        if !crypto::verify(&digest, &copayer.public_key_signature, &wallet_pub) {
            tracing::error!(copayer = %copayer.id, "copayer membership proof failed");
            return Err(Error::TrustViolation(TrustFailure::CopayerProof));
        }
        // the id must also be the canonical derivation of the claimed key
        if copayer.id.as_str() != crypto::copayer_id(&copayer.public_key) {
            tracing::error!(copayer = %copayer.id, "copayer id does not match public key");
            return Err(Error::TrustViolation(TrustFailure::CopayerProof));
        }
    }
    Ok(())
}

/// Recompute the expected address from the public key ring and derivation
/// index. A mismatch signals a compromised coordination service.
pub fn check_address(credentials: &Credentials, address: &AddressInfo) -> Result<()> {
    let m = credentials
        .m()
        .ok_or_else(|| Error::Validation("wallet info not set".into()))?;
    let expected = crypto::derive_address(credentials.public_key_ring(), m, address.path);
    if expected != address.address {
        tracing::error!(
            path = address.path,
            claimed = %address.address,
            "server-supplied address does not match local derivation"
        );
        return Err(Error::TrustViolation(TrustFailure::AddressMismatch));
    }
    Ok(())
}

/// Recompute the proposal hash from its wire fields and verify the creator's
/// signature against their public key, looked up in the ring by creator id.
pub fn check_tx_proposal(credentials: &Credentials, txp: &TxProposal) -> Result<()> {
    let creator_key = credentials
        .public_key_ring()
        .iter()
        .find(|key| crypto::copayer_id(key) == txp.creator_id.as_str());
    let Some(creator_key) = creator_key else {
        tracing::error!(proposal = %txp.id, creator = %txp.creator_id,
            "proposal creator not in public key ring");
        return Err(Error::TrustViolation(TrustFailure::ProposalSignature));
    };

    let hash = crypto::proposal_hash(
        &txp.to_address,
        txp.amount,
        txp.encrypted_message.as_deref(),
    );
    if !crypto::verify(&hash, &txp.proposal_signature, creator_key) {
        tracing::error!(proposal = %txp.id, "proposal signature failed verification");
        return Err(Error::TrustViolation(TrustFailure::ProposalSignature));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use covault_types::{CopayerId, Network, ProposalId, ProposalStatus, WalletId};

    struct Fixture {
        creds: Credentials,
        wallet_key: KeyPair,
        member_key: KeyPair,
    }

    fn fixture() -> Fixture {
        let mut creds = Credentials::create(Network::Testnet);
        let wallet_key = KeyPair::generate();
        let member_key = KeyPair::generate();
        creds
            .add_wallet_info(
                WalletId::new("w1"),
                "family",
                1,
                2,
                Some(wallet_key.private_key_hex()),
                "alice",
            )
            .unwrap();
        creds
            .add_public_key_ring(&[
                creds.request_public_key().to_string(),
                member_key.public_key_hex(),
            ])
            .unwrap();
        Fixture {
            creds,
            wallet_key,
            member_key,
        }
    }

    fn signed_copayer(f: &Fixture, name: &str) -> Copayer {
        let pubkey = f.member_key.public_key_hex();
        let digest = crypto::copayer_proof_digest(name, &pubkey);
        Copayer {
            id: CopayerId::new(crypto::copayer_id(&pubkey)),
            public_key: pubkey,
            public_key_signature: f.wallet_key.sign(&digest).unwrap(),
            name: name.to_string(),
        }
    }

    fn signed_proposal(f: &Fixture) -> TxProposal {
        let hash = crypto::proposal_hash("dest-addr", 700, Some("enc-blob"));
        TxProposal {
            id: ProposalId::new("p1"),
            creator_id: CopayerId::new(crypto::copayer_id(&f.member_key.public_key_hex())),
            to_address: "dest-addr".to_string(),
            amount: 700,
            encrypted_message: Some("enc-blob".to_string()),
            decrypted_message: None,
            proposal_signature: f.member_key.sign(&hash).unwrap(),
            status: ProposalStatus::Pending,
            actions: vec![],
            signatures: vec![],
        }
    }

    #[test]
    fn test_check_copayers_accepts_valid_proof() {
        let f = fixture();
        let copayer = signed_copayer(&f, "bob");
        assert!(check_copayers(&f.creds, &[copayer]).is_ok());
    }

    #[test]
    fn test_check_copayers_rejects_forged_name() {
        let f = fixture();
        let mut copayer = signed_copayer(&f, "bob");
        copayer.name = "mallory".to_string();
        assert!(matches!(
            check_copayers(&f.creds, &[copayer]),
            Err(Error::TrustViolation(TrustFailure::CopayerProof))
        ));
    }

    #[test]
    fn test_check_copayers_rejects_wrong_wallet_key() {
        let f = fixture();
        let mut copayer = signed_copayer(&f, "bob");
        let digest = crypto::copayer_proof_digest("bob", &copayer.public_key);
        copayer.public_key_signature = KeyPair::generate().sign(&digest).unwrap();
        assert!(check_copayers(&f.creds, &[copayer]).is_err());
    }

    #[test]
    fn test_check_copayers_rejects_mismatched_id() {
        let f = fixture();
        let mut copayer = signed_copayer(&f, "bob");
        copayer.id = CopayerId::new("someone-else");
        assert!(check_copayers(&f.creds, &[copayer]).is_err());
    }

    #[test]
    fn test_check_address_accepts_derived() {
        let f = fixture();
        let address = AddressInfo {
            address: crypto::derive_address(f.creds.public_key_ring(), 1, 3),
            path: 3,
        };
        assert!(check_address(&f.creds, &address).is_ok());
    }

    #[test]
    fn test_check_address_single_byte_flip() {
        let f = fixture();
        let mut derived = crypto::derive_address(f.creds.public_key_ring(), 1, 3);
        // flip the final character
        let last = derived.pop().unwrap();
        derived.push(if last == '0' { '1' } else { '0' });
        let address = AddressInfo {
            address: derived,
            path: 3,
        };
        assert!(matches!(
            check_address(&f.creds, &address),
            Err(Error::TrustViolation(TrustFailure::AddressMismatch))
        ));
    }

    #[test]
    fn test_check_proposal_accepts_valid() {
        let f = fixture();
        assert!(check_tx_proposal(&f.creds, &signed_proposal(&f)).is_ok());
    }

    #[test]
    fn test_check_proposal_rejects_tampered_amount() {
        let f = fixture();
        let mut txp = signed_proposal(&f);
        txp.amount += 1;
        assert!(matches!(
            check_tx_proposal(&f.creds, &txp),
            Err(Error::TrustViolation(TrustFailure::ProposalSignature))
        ));
    }

    #[test]
    fn test_check_proposal_rejects_tampered_destination() {
        let f = fixture();
        let mut txp = signed_proposal(&f);
        txp.to_address = "attacker-addr".to_string();
        assert!(check_tx_proposal(&f.creds, &txp).is_err());
    }

    #[test]
    fn test_check_proposal_rejects_unknown_creator() {
        let f = fixture();
        let mut txp = signed_proposal(&f);
        txp.creator_id = CopayerId::new("ghost");
        assert!(check_tx_proposal(&f.creds, &txp).is_err());
    }

    #[test]
    fn test_checks_are_deterministic() {
        let f = fixture();
        let txp = signed_proposal(&f);
        for _ in 0..3 {
            assert!(check_tx_proposal(&f.creds, &txp).is_ok());
        }
    }
}

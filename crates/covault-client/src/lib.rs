//! Covault Client - trust-verification and protocol-state layer for
//! shared-custody (m-of-n) wallets
//!
//! Several copayers jointly authorize spends through an untrusted
//! coordination service. The service stores wallet metadata, invitations and
//! pending proposals, and relays data between copayers, and is assumed
//! potentially malicious. This crate never acts on a server-reported fact
//! without re-deriving it from local key material first.
//!
//! # Components
//!
//! - [`Credentials`]: identity keys, wallet-level keys, derived encrypting
//!   keys, and the public key ring. Single-writer record, mutated only by
//!   the orchestrator after a verified round trip.
//! - [`auth`]: canonical-string request signing.
//! - [`verifier`]: pure predicates that recompute expected artifacts
//!   (copayer proofs, addresses, proposal signatures) and reject mismatches
//!   as trust violations.
//! - [`WalletClient`]: the orchestrator; sole caller of the transport and
//!   sole mutator of credentials.
//! - [`Transport`]: the network seam; tests inject an in-memory mock.
//!
//! # Quick Start
//!
//! ```ignore
//! use covault_client::{Config, WalletClient};
//! use covault_types::Network;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = WalletClient::new(Config::default())?;
//!     let secret = client
//!         .create_wallet("family", "alice", 2, 3, Network::Testnet)
//!         .await?;
//!     // hand `secret` to the other copayers out-of-band
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod credentials;
pub mod events;
pub mod transport;
pub mod verifier;

pub use client::{Config, TxProposalsView, WalletClient, WalletState, CANNOT_DECRYPT_PLACEHOLDER};
pub use credentials::Credentials;
pub use events::Notification;
pub use transport::{HttpTransport, RequestHeaders, Transport};

pub use covault_types::{Error, Result};

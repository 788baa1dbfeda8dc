//! Covault Types - Canonical domain types for the shared-custody wallet client
//!
//! This crate contains all foundational types for Covault with zero
//! dependencies on other covault crates. It defines:
//!
//! - Identity types (WalletId, CopayerId, ProposalId)
//! - Network selection (livenet / testnet)
//! - Server projections (Wallet, Copayer, TxProposal, AddressInfo, ...)
//! - Per-operation option structs with documented defaults
//! - The error taxonomy shared across the workspace
//!
//! # Architectural Invariants
//!
//! These types support the core Covault security posture:
//!
//! 1. The coordination service is untrusted; everything it returns is an
//!    ephemeral projection, re-fetched and re-verified on every access.
//! 2. A verifier failure is a [`Error::TrustViolation`], never an ordinary
//!    error, and is never silently downgraded.
//! 3. Failure is explicit: every fallible operation returns a typed error.

pub mod error;
pub mod identity;
pub mod network;
pub mod options;
pub mod proposal;
pub mod wallet;

pub use error::*;
pub use identity::*;
pub use network::*;
pub use options::*;
pub use proposal::*;
pub use wallet::*;

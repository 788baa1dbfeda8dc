//! Identity types for Covault
//!
//! All identifiers on the wire are opaque server-assigned strings. They get
//! strongly typed wrappers to prevent accidental mixing of different ID kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate string ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an existing identifier string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_id_type!(WalletId, "Server-assigned identifier for a shared wallet");
define_id_type!(CopayerId, "Identifier for a copayer, derived from their public key");
define_id_type!(ProposalId, "Server-assigned identifier for a transaction proposal");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_roundtrip() {
        let id = WalletId::new("w-123");
        assert_eq!(id.to_string(), "w-123");
        assert_eq!(id.as_str(), "w-123");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = ProposalId::new("txp-9");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"txp-9\"");
        let back: ProposalId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

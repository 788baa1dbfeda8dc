//! Network selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The chain a wallet lives on. Credentials are bound to exactly one network
/// at seed time and never migrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Livenet,
    Testnet,
}

impl Default for Network {
    fn default() -> Self {
        Self::Livenet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Livenet => write!(f, "livenet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "livenet" => Ok(Self::Livenet),
            "testnet" => Ok(Self::Testnet),
            other => Err(crate::Error::Validation(format!(
                "unknown network: {other}"
            ))),
        }
    }
}

//! Domain types for the hexmint color registry.
//!
//! All types are serializable/deserializable via serde + serde_yaml.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contract name reported by every deployment.
pub const CONTRACT_NAME: &str = "Color";

/// Contract symbol reported by every deployment.
pub const CONTRACT_SYMBOL: &str = "COLOR";

/// Operation signatures exposed by the registry contract.
pub const REGISTRY_INTERFACE: [&str; 6] = [
    "name()",
    "symbol()",
    "totalSupply()",
    "colors(uint256)",
    "mint(string)",
    "ownerOf(uint256)",
];

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A color string exactly as submitted (`#` followed by six characters).
///
/// The registry never normalizes case: `#ffffff` and `#FFFFFF` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorValue(pub String);

impl ColorValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the six characters after `#` as `0xRRGGBB`, if they are hex digits.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let digits = self.0.strip_prefix('#')?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let packed = u32::from_str_radix(digits, 16).ok()?;
        Some(((packed >> 16) as u8, (packed >> 8) as u8, packed as u8))
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ColorValue {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ColorValue {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// 1-based, dense token index assigned at mint time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct TokenIndex(pub u64);

impl fmt::Display for TokenIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A ledger account (hex address string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// The null identity used as `from` on every mint event.
    pub fn zero() -> Self {
        Self("0x0000000000000000000000000000000000000000".to_owned())
    }

    pub fn is_zero(&self) -> bool {
        self.0
            .strip_prefix("0x")
            .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c == '0'))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Address a registry contract is deployed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAddress(pub String);

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ContractAddress {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Numeric network identifier (5777 is the local development network).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A registered color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorToken {
    pub index: TokenIndex,
    pub value: ColorValue,
    pub owner: AccountId,
    pub minted_at: DateTime<Utc>,
}

/// Confirmation record emitted once per successful mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEvent {
    /// Always [`AccountId::zero`]: a minted token has no prior owner.
    pub from: AccountId,
    pub to: AccountId,
    pub index: TokenIndex,
}

/// Where a registry contract lives on one network, and what it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub address: ContractAddress,
    #[serde(default)]
    pub interface: Vec<String>,
    pub deployed_at: DateTime<Utc>,
}

impl Deployment {
    pub fn new(address: ContractAddress) -> Self {
        Self {
            address,
            interface: REGISTRY_INTERFACE.iter().map(|s| (*s).to_owned()).collect(),
            deployed_at: Utc::now(),
        }
    }
}

/// The contract artifact: metadata plus one deployment per network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentBook {
    pub contract_name: String,
    pub symbol: String,
    #[serde(default)]
    pub networks: BTreeMap<NetworkId, Deployment>,
}

impl DeploymentBook {
    pub fn get(&self, network: NetworkId) -> Option<&Deployment> {
        self.networks.get(&network)
    }

    pub fn insert(&mut self, network: NetworkId, deployment: Deployment) {
        self.networks.insert(network, deployment);
    }
}

impl Default for DeploymentBook {
    fn default() -> Self {
        Self {
            contract_name: CONTRACT_NAME.to_owned(),
            symbol: CONTRACT_SYMBOL.to_owned(),
            networks: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

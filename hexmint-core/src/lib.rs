//! Color token registry, its domain types and on-disk persistence.
//!
//! Public API surface:
//! - [`types`]: newtypes, tokens, confirmation events, deployment descriptors
//! - [`error`]: [`RegistryError`]
//! - [`registry`]: the append-only, uniqueness-enforcing [`Registry`]
//! - [`store`]: on-disk snapshots and the deployment book

pub mod error;
pub mod registry;
pub mod store;
pub mod types;

pub use error::RegistryError;
pub use registry::Registry;
pub use types::{
    AccountId, ColorToken, ColorValue, ContractAddress, Deployment, DeploymentBook, MintEvent,
    NetworkId, TokenIndex, CONTRACT_NAME, CONTRACT_SYMBOL,
};

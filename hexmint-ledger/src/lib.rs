//! In-process ledger hosting the color registry: deployment, account
//! approval, ordered mint processing and snapshot persistence.

pub mod approval;
pub mod config;
pub mod deploy;
mod error;
pub mod ids;
mod lock;
mod node;
pub mod runtime;
mod transport;

pub use approval::{Approver, AutoApprove, MintRequest};
pub use config::{LedgerConfig, DEFAULT_NETWORK_ID};
pub use deploy::{deploy_at, node_at, open_at, Deployed};
pub use error::LedgerError;
pub use node::{LedgerHandle, LedgerNode};

//! Error types for hexmint-sync.

use thiserror::Error;

use hexmint_core::NetworkId;

use crate::transport::TransportError;
use crate::validate::ValidationError;

/// Generic notice shown for every failure that is not a validation error.
pub const GENERIC_FAILURE_NOTICE: &str = "an unexpected error occurred; the mint was aborted";

/// All errors that can arise from client operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The contract artifact has no deployment for the transport's network.
    #[error("registry contract is not deployed on network {network}")]
    NoDeployment { network: NetworkId },

    /// The transport exposes no account to submit from.
    #[error("no account available on the ledger")]
    NoAccount,

    /// A read against the registry failed while loading state.
    #[error("failed to fetch registry state: {source}")]
    TransientFetch {
        #[source]
        source: TransportError,
    },

    /// Local pre-submission check failed; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transport refused to take the mint request at all.
    #[error("failed to send mint request: {0}")]
    Transport(TransportError),

    /// `submit` was called before a successful `load_state`.
    #[error("registry state has not been loaded")]
    NotLoaded,
}

impl SyncError {
    /// The user-facing notice for this error.
    ///
    /// Validation errors keep their specific message; everything else
    /// collapses to a deployment notice or the generic failure notice.
    pub fn notice(&self) -> String {
        match self {
            SyncError::Validation(err) => err.to_string(),
            SyncError::NoDeployment { .. } => {
                "the registry contract is not deployed on this network, so minting is unavailable"
                    .to_string()
            }
            _ => GENERIC_FAILURE_NOTICE.to_string(),
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the ledger node, its config and deployments.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry error: {0}")]
    Registry(#[from] hexmint_core::RegistryError),

    #[error("ledger has no accounts configured")]
    NoAccounts,

    #[error("{task} task join failure: {message}")]
    Join { task: &'static str, message: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LedgerError {
    LedgerError::Io {
        path: path.into(),
        source,
    }
}

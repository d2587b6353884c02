//! Error types for hexmint-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ColorValue, TokenIndex};

/// All errors that can arise from registry operations and registry persistence.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The color is already registered (exact, case-sensitive match).
    #[error("color {value} is already registered")]
    DuplicateValue { value: ColorValue },

    /// 0-based position outside `[0, total_supply)`.
    #[error("no color at position {position} (total supply {total_supply})")]
    NotFound { position: u64, total_supply: u64 },

    /// 1-based token index that was never minted.
    #[error("token {index} does not exist")]
    TokenNotFound { index: TokenIndex },

    /// A snapshot whose token list breaks uniqueness or dense indexing.
    #[error("corrupt registry snapshot: {reason}")]
    Corrupt { reason: String },

    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`, so there is no `~/.hexmint/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No ledger snapshot exists at the expected path.
    #[error("registry snapshot not found at {path}")]
    SnapshotNotFound { path: PathBuf },
}

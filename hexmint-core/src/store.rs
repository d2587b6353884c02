//! On-disk registry snapshots and the deployment book.
//!
//! # Storage layout
//!
//! ```text
//! ~/.hexmint/
//!   config.yaml                (ledger configuration, optional)
//!   deployments.yaml           (contract artifact: name, symbol, networks)
//!   ledgers/
//!     <network_id>.yaml        (registry snapshot, mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function takes an explicit `home: &Path`. Binaries resolve it once
//! through [`home_dir`]; tests always pass a `TempDir`.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RegistryError;
use crate::registry::Registry;
use crate::types::{DeploymentBook, NetworkId};

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.hexmint/`
pub fn root_at(home: &Path) -> PathBuf {
    home.join(".hexmint")
}

/// `<home>/.hexmint/config.yaml`
pub fn config_path_at(home: &Path) -> PathBuf {
    root_at(home).join("config.yaml")
}

/// `<home>/.hexmint/deployments.yaml`
pub fn deployments_path_at(home: &Path) -> PathBuf {
    root_at(home).join("deployments.yaml")
}

/// `<home>/.hexmint/ledgers/<network>.yaml`
pub fn snapshot_path_at(home: &Path, network: NetworkId) -> PathBuf {
    root_at(home).join("ledgers").join(format!("{network}.yaml"))
}

/// The user's home directory, from `dirs::home_dir()`.
pub fn home_dir() -> Result<PathBuf, RegistryError> {
    dirs::home_dir().ok_or(RegistryError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// 2. Registry snapshots
// ---------------------------------------------------------------------------

/// Load the registry snapshot for `network`.
///
/// Returns `RegistryError::SnapshotNotFound` if absent,
/// `RegistryError::Parse` (with path + line context) if malformed or if the
/// stored tokens violate the registry invariants.
pub fn load_snapshot_at(home: &Path, network: NetworkId) -> Result<Registry, RegistryError> {
    let path = snapshot_path_at(home, network);
    if !path.exists() {
        return Err(RegistryError::SnapshotNotFound { path });
    }
    read_yaml(&path)
}

/// Like [`load_snapshot_at`], but a missing snapshot yields an empty registry.
pub fn load_snapshot_or_new_at(home: &Path, network: NetworkId) -> Result<Registry, RegistryError> {
    match load_snapshot_at(home, network) {
        Err(RegistryError::SnapshotNotFound { .. }) => Ok(Registry::new()),
        other => other,
    }
}

/// Atomically save the registry snapshot for `network`.
pub fn save_snapshot_at(
    home: &Path,
    network: NetworkId,
    registry: &Registry,
) -> Result<(), RegistryError> {
    write_yaml_atomic(&snapshot_path_at(home, network), registry)
}

// ---------------------------------------------------------------------------
// 3. Deployment book
// ---------------------------------------------------------------------------

/// Load the deployment book. A missing file is an empty book (no networks).
pub fn load_deployments_at(home: &Path) -> Result<DeploymentBook, RegistryError> {
    let path = deployments_path_at(home);
    if !path.exists() {
        return Ok(DeploymentBook::default());
    }
    read_yaml(&path)
}

/// Atomically save the deployment book.
pub fn save_deployments_at(home: &Path, book: &DeploymentBook) -> Result<(), RegistryError> {
    write_yaml_atomic(&deployments_path_at(home), book)
}

// ---------------------------------------------------------------------------
// 4. Generic YAML helpers
// ---------------------------------------------------------------------------

/// Read and parse a YAML document, annotating parse failures with the path.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, RegistryError> {
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| RegistryError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write flow: serialize → `.tmp` sibling → `chmod 0600` → `rename`.
///
/// The parent directory is created with mode `0700` when missing.
pub fn write_yaml_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), RegistryError> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            set_dir_permissions(dir)?;
        }
    }
    let yaml = serde_yaml::to_string(value)?;
    let tmp_path = path.with_extension("yaml.tmp");
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

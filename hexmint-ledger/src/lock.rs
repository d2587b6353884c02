//! Advisory lock serializing snapshot writers for one network.
//!
//! Every process that persists `ledgers/<network>.yaml` takes this lock
//! around its reload-mint-save step, so two nodes sharing a home never
//! hand out the same index or overwrite each other's tokens.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use hexmint_core::{store, NetworkId};

use crate::error::{io_err, LedgerError};

/// Exclusive lock on `ledgers/<network>.lock`, released on drop.
pub(crate) struct SnapshotLock {
    file: File,
    path: PathBuf,
}

impl SnapshotLock {
    pub(crate) fn path_at(home: &Path, network: NetworkId) -> PathBuf {
        store::snapshot_path_at(home, network).with_extension("lock")
    }

    /// Block until the lock is ours.
    pub(crate) fn acquire(home: &Path, network: NetworkId) -> Result<Self, LedgerError> {
        let path = Self::path_at(home, network);
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
                restrict_dir(dir)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| io_err(&path, e))?;
        FileExt::lock_exclusive(&file).map_err(|e| io_err(&path, e))?;
        tracing::trace!(path = %path.display(), "snapshot lock acquired");

        Ok(Self { file, path })
    }
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %err, "snapshot unlock failed");
        }
    }
}

#[cfg(unix)]
fn restrict_dir(dir: &Path) -> Result<(), LedgerError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(dir, e))
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> Result<(), LedgerError> {
    Ok(())
}

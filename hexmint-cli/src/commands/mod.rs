pub mod deploy;
pub mod gallery;
pub mod mint;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexmint_core::{store, NetworkId};
use hexmint_ledger::{LedgerConfig, LedgerHandle};
use hexmint_sync::{SyncClient, SyncError};

/// Network selection shared by every command.
#[derive(Args, Debug, Clone, Copy)]
pub struct NetworkArg {
    /// Network id to operate on (defaults to the configured one).
    #[arg(long)]
    pub network: Option<u64>,
}

impl NetworkArg {
    /// Home directory plus the ledger config, with `--network` applied.
    pub fn resolve(self) -> Result<(PathBuf, LedgerConfig)> {
        let home = store::home_dir().context("could not determine home directory")?;
        let mut config = LedgerConfig::load_at(&home).context("failed to load ledger config")?;
        if let Some(network) = self.network {
            config.network_id = NetworkId(network);
        }
        Ok((home, config))
    }
}

/// Load the client mirror, turning load failures into user notices.
pub async fn load_client(client: &mut SyncClient<LedgerHandle>) -> Result<()> {
    match client.load_state().await {
        Ok(_) => Ok(()),
        Err(err @ SyncError::NoDeployment { .. }) => {
            anyhow::bail!("{} (run `hexmint deploy` first)", err.notice())
        }
        Err(err) => Err(anyhow::Error::new(err).context("failed to load registry state")),
    }
}

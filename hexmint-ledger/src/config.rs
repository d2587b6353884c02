//! Ledger node configuration (`~/.hexmint/config.yaml`).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use hexmint_core::{store, AccountId, NetworkId};

use crate::error::LedgerError;
use crate::ids::dev_accounts;

pub const DEFAULT_NETWORK_ID: NetworkId = NetworkId(5777);
pub const DEFAULT_ACCOUNT_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub network_id: NetworkId,
    /// Accounts the node signs for. The first one deploys.
    pub accounts: Vec<AccountId>,
    /// Pause between accepting a mint and applying it.
    pub confirmation_delay_ms: u64,
    /// Write a registry snapshot after every confirmed mint.
    pub persist: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network_id: DEFAULT_NETWORK_ID,
            accounts: dev_accounts(DEFAULT_ACCOUNT_COUNT),
            confirmation_delay_ms: 0,
            persist: true,
        }
    }
}

impl LedgerConfig {
    /// In-memory node on `network_id`, useful for tests.
    pub fn ephemeral(network_id: NetworkId) -> Self {
        Self {
            network_id,
            persist: false,
            ..Self::default()
        }
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }

    pub fn deployer(&self) -> Result<&AccountId, LedgerError> {
        self.accounts.first().ok_or(LedgerError::NoAccounts)
    }

    /// Load the config under `home`, falling back to defaults when absent.
    pub fn load_at(home: &Path) -> Result<Self, LedgerError> {
        let path = store::config_path_at(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(store::read_yaml(&path)?)
    }

    pub fn save_at(&self, home: &Path) -> Result<(), LedgerError> {
        store::write_yaml_atomic(&store::config_path_at(home), self)?;
        Ok(())
    }
}

//! Registry deployments recorded in `~/.hexmint/deployments.yaml`.

use std::path::Path;

use hexmint_core::{store, Deployment, DeploymentBook, Registry};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::ids::contract_address;
use crate::lock::SnapshotLock;
use crate::node::{LedgerHandle, LedgerNode};

/// Result of [`deploy_at`].
#[derive(Debug, Clone)]
pub struct Deployed {
    pub deployment: Deployment,
    pub book: DeploymentBook,
    /// `false` when the network already had a deployment.
    pub created: bool,
}

/// Deploy the registry on the configured network unless the book already
/// records a deployment there.
///
/// A new deployment starts from an empty registry; any snapshot left from an
/// earlier deployment on that network is replaced.
pub fn deploy_at(home: &Path, config: &LedgerConfig) -> Result<Deployed, LedgerError> {
    let mut book = store::load_deployments_at(home)?;
    let network = config.network_id;
    if let Some(existing) = book.get(network) {
        tracing::debug!(network = %network, contract = %existing.address, "deployment already recorded");
        return Ok(Deployed {
            deployment: existing.clone(),
            book,
            created: false,
        });
    }

    let deployer = config.deployer()?;
    let address = contract_address(network, deployer, book.networks.len() as u64);
    let deployment = Deployment::new(address);
    if config.persist {
        let _lock = SnapshotLock::acquire(home, network)?;
        store::save_snapshot_at(home, network, &Registry::new())?;
    }
    book.insert(network, deployment.clone());
    store::save_deployments_at(home, &book)?;

    tracing::info!(
        network = %network,
        contract = %deployment.address,
        deployer = %deployer,
        "registry deployed",
    );
    Ok(Deployed {
        deployment,
        book,
        created: true,
    })
}

/// Prepare a node for the configured network from the state under `home`.
///
/// The node serves the recorded deployment, if any, and resumes from its
/// snapshot when persistence is on. Returns the builder together with the
/// deployment book a client needs to find the contract.
pub fn node_at(home: &Path, config: LedgerConfig) -> Result<(LedgerNode, DeploymentBook), LedgerError> {
    let book = store::load_deployments_at(home)?;
    let network = config.network_id;
    let registry = if config.persist {
        store::load_snapshot_or_new_at(home, network)?
    } else {
        Registry::new()
    };
    let persist = config.persist;

    let mut node = LedgerNode::new(config, registry);
    if let Some(deployment) = book.get(network) {
        node = node.deployed_at(deployment.address.clone());
    }
    if persist {
        node = node.persist_to(home);
    }
    Ok((node, book))
}

/// [`node_at`], spawned with automatic approval.
pub fn open_at(home: &Path, config: LedgerConfig) -> Result<(LedgerHandle, DeploymentBook), LedgerError> {
    let (node, book) = node_at(home, config)?;
    Ok((node.spawn(), book))
}

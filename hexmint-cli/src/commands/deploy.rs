//! `hexmint deploy`: create or locate the registry deployment.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hexmint_ledger::deploy_at;

use super::NetworkArg;

#[derive(Args, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub network: NetworkArg,
}

impl DeployArgs {
    pub fn run(self) -> Result<()> {
        let (home, config) = self.network.resolve()?;
        let deployed = deploy_at(&home, &config)
            .with_context(|| format!("deploy failed on network {}", config.network_id))?;

        let verb = if deployed.created {
            "deployed".green().bold()
        } else {
            "already deployed".yellow().bold()
        };
        println!(
            "✓ {} ({}) {verb} on network {} at {}",
            deployed.book.contract_name,
            deployed.book.symbol,
            config.network_id,
            deployed.deployment.address,
        );
        Ok(())
    }
}

//! `hexmint status`: deployment metadata and supply.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use hexmint_ledger::{open_at, runtime};
use hexmint_sync::{SyncClient, SyncError};

use super::NetworkArg;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub network: NetworkArg,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    name: String,
    symbol: String,
    network: u64,
    deployed: bool,
    contract: Option<String>,
    account: Option<String>,
    total_supply: Option<u64>,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "field")]
    field: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let (home, config) = self.network.resolve()?;
        let report = runtime::block_on(async move {
            let (ledger, book) = open_at(&home, config).context("failed to open ledger")?;
            let mut report = StatusReport {
                name: book.contract_name.clone(),
                symbol: book.symbol.clone(),
                network: ledger.network().0,
                deployed: false,
                contract: None,
                account: None,
                total_supply: None,
            };
            let mut client = SyncClient::new(ledger.clone(), book);
            let loaded = match client.load_state().await {
                Ok(state) => {
                    report.deployed = true;
                    report.account = Some(state.account.0.clone());
                    report.total_supply = Some(state.total_supply);
                    report.contract = client.contract().map(|c| c.0.clone());
                    Ok(())
                }
                Err(SyncError::NoDeployment { .. }) => Ok(()),
                Err(err) => Err(anyhow::Error::new(err).context("failed to load registry state")),
            };
            ledger.shutdown().await;
            loaded.map(|()| report)
        })??;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }
        print_table(report);
        Ok(())
    }
}

fn print_table(report: StatusReport) {
    let deployment = if report.deployed {
        "DEPLOYED".green().bold()
    } else {
        "NOT DEPLOYED".red().bold()
    };
    println!(
        "hexmint v{} | {} ({}) | network {} | {deployment}",
        env!("CARGO_PKG_VERSION"),
        report.name,
        report.symbol,
        report.network,
    );
    if !report.deployed {
        println!("Run 'hexmint deploy' to create the registry on this network.");
        return;
    }

    let rows = vec![
        StatusRow {
            field: "contract",
            value: report.contract.unwrap_or_default(),
        },
        StatusRow {
            field: "account",
            value: report.account.unwrap_or_default(),
        },
        StatusRow {
            field: "total supply",
            value: report.total_supply.unwrap_or_default().to_string(),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

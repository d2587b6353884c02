//! `hexmint mint`: validate a color, submit it and wait for the outcome.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hexmint_core::AccountId;
use hexmint_ledger::{node_at, runtime, LedgerHandle, MintRequest};
use hexmint_sync::error::GENERIC_FAILURE_NOTICE;
use hexmint_sync::{SubmissionEvent, SubmissionOutcome, SyncClient, SyncError};

use super::{load_client, NetworkArg};

#[derive(Args, Debug)]
pub struct MintArgs {
    /// Color to mint, `#` followed by six characters.
    pub color: String,

    /// Mint from this account instead of the ledger's first one.
    #[arg(long)]
    pub account: Option<String>,

    /// Ask for approval on stdin before the mint is sent.
    #[arg(long)]
    pub confirm: bool,

    #[command(flatten)]
    pub network: NetworkArg,
}

impl MintArgs {
    pub fn run(self) -> Result<()> {
        let (home, config) = self.network.resolve()?;
        let (mut node, book) = node_at(&home, config).context("failed to open ledger")?;
        if self.confirm {
            node = node.with_approver(prompt_approval);
        }

        runtime::block_on(async move {
            let ledger = node.spawn();
            let mut client = SyncClient::new(ledger.clone(), book);
            if let Some(account) = self.account {
                client = client.with_account(AccountId(account));
            }
            let result = mint(&mut client, &self.color).await;
            ledger.shutdown().await;
            result
        })?
    }
}

async fn mint(client: &mut SyncClient<LedgerHandle>, raw: &str) -> Result<()> {
    load_client(client).await?;

    let mut handle = client
        .submit_raw(raw)
        .await
        .map_err(|err: SyncError| anyhow::anyhow!(err.notice()))?;

    let mut outcome = None;
    while let Some(event) = client.next_event(&mut handle).await {
        match event {
            SubmissionEvent::Accepted { tx } => {
                println!("{} {} accepted as {tx}", "⋯".bright_black(), handle.value());
            }
            SubmissionEvent::Confirmed { receipt } => {
                outcome = Some(SubmissionOutcome::Confirmed(receipt));
            }
            SubmissionEvent::Rejected { cause } if cause.is_user_cancellation() => {
                outcome = Some(SubmissionOutcome::Cancelled);
            }
            SubmissionEvent::Rejected { cause } => {
                outcome = Some(SubmissionOutcome::Failed(cause));
            }
        }
    }

    match outcome {
        Some(SubmissionOutcome::Confirmed(receipt)) => {
            println!(
                "{} minted {} as token {} (block {})",
                "✓".green().bold(),
                handle.value(),
                receipt.event.index,
                receipt.block_number,
            );
            Ok(())
        }
        Some(SubmissionOutcome::Cancelled) => Ok(()),
        Some(SubmissionOutcome::Failed(_)) | None => anyhow::bail!(GENERIC_FAILURE_NOTICE),
    }
}

/// Blocks on stdin. The node runs approvers on its blocking pool.
fn prompt_approval(request: &MintRequest) -> bool {
    print!("Mint {} from {}? [y/N] ", request.value, request.from);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

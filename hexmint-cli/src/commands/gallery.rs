//! `hexmint gallery`: every minted color, in mint order.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use hexmint_core::ColorValue;
use hexmint_ledger::{open_at, runtime};
use hexmint_sync::SyncClient;

use super::{load_client, NetworkArg};

#[derive(Args, Debug)]
pub struct GalleryArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub network: NetworkArg,
}

#[derive(Serialize)]
struct GalleryEntryJson<'a> {
    index: u64,
    color: &'a str,
}

impl GalleryArgs {
    pub fn run(self) -> Result<()> {
        let (home, config) = self.network.resolve()?;
        let colors = runtime::block_on(async move {
            let (ledger, book) = open_at(&home, config).context("failed to open ledger")?;
            let mut client = SyncClient::new(ledger.clone(), book);
            let loaded = load_client(&mut client).await;
            ledger.shutdown().await;
            loaded.map(|()| client.colors().to_vec())
        })??;

        if self.json {
            print_json(&colors)
        } else {
            print_swatches(&colors);
            Ok(())
        }
    }
}

fn print_json(colors: &[ColorValue]) -> Result<()> {
    let entries: Vec<GalleryEntryJson<'_>> = colors
        .iter()
        .zip(1u64..)
        .map(|(color, index)| GalleryEntryJson {
            index,
            color: color.as_str(),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&entries).context("failed to serialize gallery JSON")?
    );
    Ok(())
}

fn print_swatches(colors: &[ColorValue]) {
    if colors.is_empty() {
        println!("No colors minted yet. Run `hexmint mint <color>` to add one.");
        return;
    }
    for (color, index) in colors.iter().zip(1u64..) {
        println!("{index:>4}  {}  {color}", swatch(color));
    }
}

/// Truecolor block for hex colors; a placeholder for anything else.
fn swatch(color: &ColorValue) -> String {
    match color.rgb() {
        Some((r, g, b)) => "████".truecolor(r, g, b).to_string(),
        None => "····".bright_black().to_string(),
    }
}

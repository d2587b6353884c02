//! hexmint: mint unique hex colors into a registry ledger.
//!
//! # Usage
//!
//! ```text
//! hexmint deploy [--network <id>]
//! hexmint mint <color> [--account <address>] [--confirm] [--network <id>]
//! hexmint gallery [--json] [--network <id>]
//! hexmint status [--json] [--network <id>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    deploy::DeployArgs, gallery::GalleryArgs, mint::MintArgs, status::StatusArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "hexmint",
    version,
    about = "Mint unique hex colors as registry tokens",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy the color registry on a network, or show the existing deployment.
    Deploy(DeployArgs),

    /// Validate and mint a new color.
    Mint(MintArgs),

    /// List every minted color in mint order.
    Gallery(GalleryArgs),

    /// Show deployment metadata and supply.
    Status(StatusArgs),
}

fn main() -> Result<()> {
    hexmint_ledger::runtime::init_tracing("warn");
    let cli = Cli::parse();
    match cli.command {
        Commands::Deploy(args) => args.run(),
        Commands::Mint(args) => args.run(),
        Commands::Gallery(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}

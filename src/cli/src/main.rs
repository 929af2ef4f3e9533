//! CLI wallet for lineage-bound coins.

mod commands;
mod config;
mod errors;
mod wallet;

use anyhow::Result;
use colored::Colorize;
use commands::{balance, clawback, export_seed, init_seed, issue, register, send, settle};
use config::WalletConfig;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command line arguments for the CLI wallet.
#[derive(Debug, StructOpt)]
#[structopt(name = "strand", about = "Wallet for lineage-bound coins")]
struct Opt {
    /// Path to the configuration file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Path to the wallet file
    #[structopt(short, long, parse(from_os_str))]
    wallet: Option<PathBuf>,

    /// Subcommand to run
    #[structopt(subcommand)]
    cmd: Command,
}

/// Subcommands for the CLI wallet.
#[derive(Debug, StructOpt)]
enum Command {
    /// Initialize a new seed
    #[structopt(name = "init-seed")]
    InitSeed,

    /// Export the seed
    #[structopt(name = "export-seed")]
    ExportSeed,

    /// Register an ownership chain so coins locked to it become visible
    #[structopt(name = "register")]
    Register {
        /// Owner keys as hex, oldest ancestor first
        #[structopt(required = true)]
        owners: Vec<String>,
    },

    /// Show balances per registered commitment
    #[structopt(name = "balance")]
    Balance {
        /// Include the effect of pending spends
        #[structopt(long)]
        unconfirmed: bool,
    },

    /// Mint a genesis coin locked to this wallet's own lineage
    #[structopt(name = "issue")]
    Issue {
        /// Amount to mint
        #[structopt(long)]
        amount: u64,
    },

    /// Send coins, extending the chain by one owner
    #[structopt(name = "send")]
    Send {
        /// Source commitment hash (hex)
        #[structopt(long)]
        source: String,

        /// Receiver owner key (hex)
        #[structopt(long)]
        to: String,

        /// Amount to send
        #[structopt(long)]
        amount: u64,
    },

    /// Return coins to an ancestor of their chain
    #[structopt(name = "clawback")]
    Clawback {
        /// Source commitment hash (hex)
        #[structopt(long)]
        source: String,

        /// Ancestor depth to truncate the chain to
        #[structopt(long)]
        depth: usize,

        /// Amount to return
        #[structopt(long)]
        amount: u64,
    },

    /// Apply a pending bundle the external ledger has finalized
    #[structopt(name = "settle")]
    Settle {
        /// Bundle id (hex)
        #[structopt(long)]
        bundle: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command line arguments
    let opt = Opt::from_args();

    // Load configuration
    let config = match &opt.config {
        Some(path) => WalletConfig::from_file(path)?,
        None => WalletConfig::default(),
    };

    // Determine wallet file
    let wallet_file = match opt.wallet {
        Some(path) => path,
        None => {
            let mut dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            dir.push("strand");
            dir.push("wallet.dat");
            dir
        }
    };

    // Create parent directory if it doesn't exist
    if let Some(parent) = wallet_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Run the appropriate command
    match opt.cmd {
        Command::InitSeed => {
            let owner = init_seed::run(&wallet_file)?;
            println!("{} {}", "Seed initialized:".green(), wallet_file.display());
            println!("{} {}", "Owner key:".green(), hex::encode(owner));
        }
        Command::ExportSeed => {
            let seed = export_seed::run(&wallet_file)?;
            println!("{} {}", "Seed:".green(), seed);
            println!("{}", "WARNING: Keep this seed safe and private!".red());
        }
        Command::Register { owners } => {
            let lock_hash = register::run(&config, &wallet_file, &owners)?;
            println!("{} {}", "Registered:".green(), hex::encode(lock_hash));
        }
        Command::Balance { unconfirmed } => {
            let total = balance::run(&config, &wallet_file, unconfirmed)?;
            println!("{} {}", "Total:".green(), total);
        }
        Command::Issue { amount } => {
            let bundle_id = issue::run(&config, &wallet_file, amount)?;
            println!("{} {}", "Issued, bundle:".green(), hex::encode(bundle_id));
        }
        Command::Send { source, to, amount } => {
            let bundle_id = send::run(&config, &wallet_file, &source, &to, amount)?;
            println!("{} {}", "Sent, bundle:".green(), hex::encode(bundle_id));
        }
        Command::Clawback {
            source,
            depth,
            amount,
        } => {
            let bundle_id = clawback::run(&config, &wallet_file, &source, depth, amount)?;
            println!("{} {}", "Clawed back, bundle:".green(), hex::encode(bundle_id));
        }
        Command::Settle { bundle } => {
            settle::run(&config, &wallet_file, &bundle)?;
            println!("{} {}", "Settled:".green(), bundle);
        }
    }

    Ok(())
}

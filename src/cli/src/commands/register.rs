//! Register-lineage command for the CLI wallet.

use crate::commands::{open_ledger, parse_hash};
use crate::config::WalletConfig;
use crate::errors::CliError;
use crate::wallet::WalletStore;
use std::path::Path;
use strand_core::{Hash, Lineage, OwnerId};
use tracing::info;

/// Runs the register command: registers the ownership chain given as hex
/// owner keys, oldest ancestor first, and returns its commitment hash.
pub fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    owners: &[String],
) -> Result<Hash, CliError> {
    let mut store = WalletStore::load(&wallet_path)?;

    let owners: Vec<OwnerId> = owners
        .iter()
        .map(|o| parse_hash(o))
        .collect::<Result<_, _>>()?;
    let lineage = Lineage::new(owners)?;

    let ledger = open_ledger(config, &store)?;
    let lock_hash = ledger.register_lineage(lineage);
    info!("registered lineage under {}", hex::encode(lock_hash));

    store.ledger = ledger.snapshot();
    store.save(&wallet_path)?;

    Ok(lock_hash)
}

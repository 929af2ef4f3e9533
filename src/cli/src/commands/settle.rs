//! Settle command for the CLI wallet.

use crate::commands::{open_ledger, parse_hash};
use crate::config::WalletConfig;
use crate::errors::CliError;
use crate::wallet::WalletStore;
use std::path::Path;
use tracing::info;

/// Runs the settle command: applies a pending bundle the external ledger has
/// finalized, releasing its reservations.
pub fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    bundle: &str,
) -> Result<(), CliError> {
    let mut store = WalletStore::load(&wallet_path)?;
    let bundle_id = parse_hash(bundle)?;
    let ledger = open_ledger(config, &store)?;

    if !ledger.settle_bundle(&bundle_id) {
        return Err(CliError::WalletError(format!(
            "bundle {} is not pending",
            bundle
        )));
    }
    info!("settled bundle {}", bundle);

    store.ledger = ledger.snapshot();
    store.save(&wallet_path)?;

    Ok(())
}

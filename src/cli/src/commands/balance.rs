//! Balance command for the CLI wallet.

use crate::commands::open_ledger;
use crate::config::WalletConfig;
use crate::errors::CliError;
use crate::wallet::WalletStore;
use std::path::Path;
use tracing::debug;

/// Runs the balance command: prints one line per registered commitment and
/// returns the total.
pub fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    unconfirmed: bool,
) -> Result<u64, CliError> {
    let store = WalletStore::load(wallet_path)?;
    let ledger = open_ledger(config, &store)?;

    let balance = if unconfirmed {
        ledger.unconfirmed_balance()
    } else {
        ledger.confirmed_balance()
    };
    debug!("{} commitments carry a balance", balance.len());

    let mut total: u64 = 0;
    for (lock_hash, value) in &balance {
        match ledger.lineage_for(lock_hash) {
            Some(lineage) => {
                println!("{}  {:>12}  {}", hex::encode(lock_hash), value, lineage);
            }
            None => {
                println!("{}  {:>12}", hex::encode(lock_hash), value);
            }
        }
        total += value;
    }

    Ok(total)
}

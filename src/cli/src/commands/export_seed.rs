//! Export seed command for the CLI wallet.

use crate::errors::CliError;
use crate::wallet::WalletStore;
use std::path::Path;

/// Runs the export-seed command.
pub fn run<P: AsRef<Path>>(wallet_path: P) -> Result<String, CliError> {
    let wallet = WalletStore::load(wallet_path)?;
    Ok(wallet.mnemonic().to_string())
}

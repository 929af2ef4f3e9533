//! Initialize seed command for the CLI wallet.

use crate::errors::CliError;
use crate::wallet::WalletStore;
use std::path::Path;
use strand_core::OwnerId;
use tracing::{debug, info};

/// Runs the init-seed command.
pub fn run<P: AsRef<Path>>(wallet_path: P) -> Result<OwnerId, CliError> {
    // Refuse to clobber an existing wallet
    if wallet_path.as_ref().exists() {
        return Err(CliError::WalletError(
            "Wallet file already exists. Use export-seed to view the seed.".to_string(),
        ));
    }

    // Create a new wallet
    let wallet = WalletStore::new()?;
    debug!("Created new wallet with mnemonic: {}", wallet.mnemonic());

    // Save the wallet
    wallet.save(&wallet_path)?;
    info!("Wallet saved to {}", wallet_path.as_ref().display());

    wallet.owner_id()
}

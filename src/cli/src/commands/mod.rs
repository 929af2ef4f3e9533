//! Commands for the CLI wallet.

pub mod balance;
pub mod clawback;
pub mod export_seed;
pub mod init_seed;
pub mod issue;
pub mod register;
pub mod send;
pub mod settle;

use crate::config::WalletConfig;
use crate::errors::CliError;
use crate::wallet::WalletStore;
use std::fs;
use std::path::{Path, PathBuf};
use strand_core::{Hash, SpendBundle};
use strand_wallet::LineageLedger;

/// Parses a 32-byte hex argument.
pub fn parse_hash(input: &str) -> Result<Hash, CliError> {
    let bytes = hex::decode(input)
        .map_err(|e| CliError::InvalidArgument(format!("invalid hex: {}", e)))?;
    if bytes.len() != 32 {
        return Err(CliError::InvalidArgument(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

/// Rebuilds the in-memory ledger from the wallet file's snapshot.
pub fn open_ledger(
    config: &WalletConfig,
    store: &WalletStore,
) -> Result<LineageLedger, CliError> {
    Ok(LineageLedger::from_snapshot(
        config.lock_template()?,
        store.ledger.clone(),
    ))
}

/// Writes a finished bundle to the outbox for the submission collaborator.
pub fn write_bundle(config: &WalletConfig, bundle: &SpendBundle) -> Result<PathBuf, CliError> {
    let dir = Path::new(&config.outbox);
    fs::create_dir_all(dir)?;

    let name = format!("bundle-{}.json", &hex::encode(bundle.bundle_id())[..16]);
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(bundle)?)?;
    Ok(path)
}

//! Genesis issuance command for the CLI wallet.

use crate::commands::{open_ledger, write_bundle};
use crate::config::WalletConfig;
use crate::errors::CliError;
use crate::wallet::WalletStore;
use byteorder::{ByteOrder, LittleEndian};
use sha2::{Digest, Sha256};
use std::path::Path;
use strand_core::bundle::{anyone_can_spend_lock_hash, issue_genesis};
use strand_core::{Coin, Hash, Lineage, OwnerId};
use tracing::info;

/// Runs the issue command: mints a genesis coin of `amount` locked to this
/// wallet's single-owner lineage and writes the bundle to the outbox.
pub fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    amount: u64,
) -> Result<Hash, CliError> {
    let mut store = WalletStore::load(&wallet_path)?;
    let owner = store.owner_id()?;
    let template = config.lock_template()?;
    let ledger = open_ledger(config, &store)?;

    let lineage = Lineage::genesis(owner);
    let lock_hash = ledger.register_lineage(lineage.clone());

    // The anyone-can-spend parent the mint consumes; a fresh id per issuance
    let parent = Coin::new(
        genesis_parent_id(&owner, store.issued),
        anyone_can_spend_lock_hash(),
        amount,
    );
    let bundle = issue_genesis(&template, &parent, &lineage, amount)?;
    ledger.record_pending_bundle(&bundle);

    let path = write_bundle(config, &bundle)?;
    info!(
        "issued {} to {} (bundle at {})",
        amount,
        hex::encode(lock_hash),
        path.display()
    );

    store.issued += 1;
    store.ledger = ledger.snapshot();
    store.save(&wallet_path)?;

    Ok(bundle.bundle_id())
}

fn genesis_parent_id(owner: &OwnerId, issued: u64) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(owner);

    let mut counter = [0u8; 8];
    LittleEndian::write_u64(&mut counter, issued);
    hasher.update(counter);

    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

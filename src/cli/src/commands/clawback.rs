//! Clawback command for the CLI wallet.

use crate::commands::{open_ledger, parse_hash, write_bundle};
use crate::config::WalletConfig;
use crate::errors::CliError;
use crate::wallet::WalletStore;
use std::path::Path;
use strand_core::signing::SignaturePolicy;
use strand_core::Hash;
use tracing::info;

/// Runs the clawback command: returns `amount` from the lineage registered
/// under `source` to its ancestor chain of the given depth.
pub fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    source: &str,
    depth: usize,
    amount: u64,
) -> Result<Hash, CliError> {
    let mut store = WalletStore::load(&wallet_path)?;
    let source_hash = parse_hash(source)?;
    let keypair = store.keypair()?;
    let ledger = open_ledger(config, &store)?;

    let source_lineage = ledger.lineage_for(&source_hash).ok_or_else(|| {
        CliError::InvalidArgument(format!("source commitment {} is not registered", source))
    })?;

    let ancestor = source_lineage.truncated(depth)?;
    ledger.register_lineage(ancestor.clone());

    let record = ledger.generate_signed_spend(
        &[amount],
        &[ancestor],
        &source_hash,
        &keypair,
        config.domain_tag(),
        SignaturePolicy::Required,
    )?;

    let path = write_bundle(config, &record.bundle)?;
    info!(
        "clawed back {} from {} to depth {} (bundle at {})",
        amount,
        source,
        depth,
        path.display()
    );

    store.ledger = ledger.snapshot();
    store.save(&wallet_path)?;

    Ok(record.bundle.bundle_id())
}

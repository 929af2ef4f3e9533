//! Send command for the CLI wallet.

use crate::commands::{open_ledger, parse_hash, write_bundle};
use crate::config::WalletConfig;
use crate::errors::CliError;
use crate::wallet::WalletStore;
use std::path::Path;
use strand_core::signing::SignaturePolicy;
use strand_core::Hash;
use tracing::info;

/// Runs the send command: hands `amount` from the lineage registered under
/// `source` to `to`, extending the chain by one owner.
pub fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    source: &str,
    to: &str,
    amount: u64,
) -> Result<Hash, CliError> {
    let mut store = WalletStore::load(&wallet_path)?;
    let source_hash = parse_hash(source)?;
    let to_owner = parse_hash(to)?;
    let keypair = store.keypair()?;
    let ledger = open_ledger(config, &store)?;

    let source_lineage = ledger.lineage_for(&source_hash).ok_or_else(|| {
        CliError::InvalidArgument(format!("source commitment {} is not registered", source))
    })?;

    // The receiver's chain is ours with one more owner; register it so the
    // outgoing value stays visible.
    let receiver = source_lineage.child(to_owner);
    ledger.register_lineage(receiver.clone());

    let record = ledger.generate_signed_spend(
        &[amount],
        &[receiver],
        &source_hash,
        &keypair,
        config.domain_tag(),
        SignaturePolicy::Required,
    )?;

    let path = write_bundle(config, &record.bundle)?;
    info!(
        "sent {} from {} (bundle at {})",
        amount,
        source,
        path.display()
    );

    store.ledger = ledger.snapshot();
    store.save(&wallet_path)?;

    Ok(record.bundle.bundle_id())
}

//! Insert-only registry of lineages keyed by their commitment hashes.

use serde::{Deserialize, Serialize};
use strand_core::commitment::lock_hash_for_lineage;
use strand_core::{Hash, Lineage, LockTemplate};
use tracing::debug;

/// A derived-address record materialized when a lineage is registered, so
/// future incoming coins to its commitment hash are recognized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationRecord {
    /// Position of this record in registration order
    pub index: u32,
    /// The locking-condition hash incoming coins are recognized by
    pub lock_hash: Hash,
    /// The registered ownership chain
    pub lineage: Lineage,
}

/// Maps commitment hashes to the lineages that produce them.
///
/// Entries are never removed: historical balances stay interpretable only as
/// long as every hash seen in the past still resolves.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LineageRegistry {
    records: Vec<DerivationRecord>,
}

impl LineageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from previously stored records.
    pub fn from_records(records: Vec<DerivationRecord>) -> Self {
        Self { records }
    }

    /// Registers a lineage, materializing a fresh derived-address record for
    /// it, and returns its commitment hash. Registering the same lineage
    /// twice is a no-op.
    pub fn register(&mut self, template: &LockTemplate, lineage: Lineage) -> Hash {
        let lock_hash = lock_hash_for_lineage(template, &lineage);
        if self.lineage_for(&lock_hash).is_some() {
            return lock_hash;
        }

        debug!(
            "registering lineage {} under lock hash {}",
            lineage,
            hex::encode(lock_hash)
        );
        self.records.push(DerivationRecord {
            index: self.records.len() as u32,
            lock_hash,
            lineage,
        });
        lock_hash
    }

    /// Looks up the lineage registered under a commitment hash.
    pub fn lineage_for(&self, lock_hash: &Hash) -> Option<&Lineage> {
        self.records
            .iter()
            .find(|r| r.lock_hash == *lock_hash)
            .map(|r| &r.lineage)
    }

    /// Whether a commitment hash has been registered.
    pub fn is_registered(&self, lock_hash: &Hash) -> bool {
        self.lineage_for(lock_hash).is_some()
    }

    /// All derived-address records, in registration order.
    pub fn records(&self) -> &[DerivationRecord] {
        &self.records
    }

    /// The number of registered lineages.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

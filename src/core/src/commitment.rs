//! Locking-condition derivation for lineage-bound coins.
//!
//! A coin's lock commits to the pair (template, lineage). The template is a
//! partial-application primitive on chain; here it is treated as an opaque
//! byte identity and the derivation as a hash combination, so the committed
//! lock can be recomputed from the revealed lineage and matched against the
//! coin. A coin can only be spent by revealing a lineage whose commitment
//! hash equals the coin's lock hash, which is the sole membrane preventing
//! cross-lineage spending.

use crate::types::{Hash, Lineage, LockTemplate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The full locking condition revealed when a coin is spent: the hash of the
/// template it commits to, and the lineage bound into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockingProgram {
    /// Hash of the locking template itself
    pub template_hash: Hash,
    /// The ownership chain bound into the lock
    pub lineage: Lineage,
}

impl LockingProgram {
    /// Computes the locking-condition hash this program reveals to.
    pub fn lock_hash(&self) -> Hash {
        combine(self.template_hash, self.lineage.lineage_hash())
    }
}

/// Derives the full locking program binding `lineage` into `template`.
pub fn locking_program_for_lineage(template: &LockTemplate, lineage: &Lineage) -> LockingProgram {
    LockingProgram {
        template_hash: template.template_hash(),
        lineage: lineage.clone(),
    }
}

/// Derives the locking-condition hash for a lineage.
pub fn lock_hash_for_lineage(template: &LockTemplate, lineage: &Lineage) -> Hash {
    combine(template.template_hash(), lineage.lineage_hash())
}

/// Fast path: derives the locking-condition hash from a pre-hashed lineage,
/// without materializing the full program.
pub fn lock_hash_for_lineage_hash(template: &LockTemplate, lineage_hash: Hash) -> Hash {
    combine(template.template_hash(), lineage_hash)
}

fn combine(template_hash: Hash, lineage_hash: Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(template_hash);
    hasher.update(lineage_hash);

    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

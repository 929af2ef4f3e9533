//! Ring-linked spend-bundle assembly.
//!
//! N coin spends are arranged in a cycle. Each spend reveals a compact
//! commitment to its own effect (coin id + declared outputs) together with
//! its predecessor's and successor's commitments and its running subtotal.
//! The verifier chain-validates conservation one hop at a time from locally
//! available data; no global state is consulted during evaluation. The order
//! of the spends is the caller's and affects nothing except which spend is
//! "prev"/"next" of which.

use crate::commitment::{lock_hash_for_lineage, locking_program_for_lineage, LockingProgram};
use crate::conservation::subtotals_for_deltas;
use crate::errors::CoreError;
use crate::signing::AggregateSignature;
use crate::types::{Amount, Coin, Hash, Lineage, LockTemplate, OwnerId};
use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// The locking program bytes of the anyone-can-spend parent used for genesis
/// issuance: it simply returns its conditions.
pub const ANYONE_CAN_SPEND_PROGRAM: &[u8] = &[1];

/// The lock hash of the anyone-can-spend program.
pub fn anyone_can_spend_lock_hash() -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(ANYONE_CAN_SPEND_PROGRAM);

    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// A coin paired with the lineage that produces its locking-condition hash.
///
/// Created by the caller from ledger state; consumed exactly once by
/// [`build_spend_descriptors`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendableCoin {
    /// The unspent coin being consumed
    pub coin: Coin,
    /// The ownership chain whose commitment matches the coin's lock hash
    pub lineage: Lineage,
}

impl SpendableCoin {
    /// Pairs a coin with its lineage.
    pub fn new(coin: Coin, lineage: Lineage) -> Self {
        Self { coin, lineage }
    }
}

/// One declared output of a spend: the receiver's lineage and the amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// The full ownership chain of the output coin
    pub receiver: Lineage,
    /// The value of the output coin
    pub amount: Amount,
}

impl Payment {
    /// Creates a payment to `receiver` of `amount`.
    pub fn new(receiver: Lineage, amount: Amount) -> Self {
        Self { receiver, amount }
    }
}

/// The effect a spend has on its coin's lineage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpendKind {
    /// Creates the first coin of a lineage from a plain parent coin
    Mint,
    /// Hands value along or across the chain without shortening it
    Transfer,
    /// Returns value to an earlier ancestor of the chain
    Clawback,
}

impl SpendKind {
    /// Classifies a spend by the relation between the input lineage and its
    /// declared receivers. Any receiver that is a proper ancestor prefix of
    /// the input chain makes the spend a clawback, since the template must
    /// permit truncation for it.
    pub fn classify(input: &Lineage, payments: &[Payment]) -> SpendKind {
        if payments.iter().any(|p| p.receiver.is_ancestor_of(input)) {
            SpendKind::Clawback
        } else {
            SpendKind::Transfer
        }
    }
}

impl fmt::Display for SpendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpendKind::Mint => write!(f, "mint"),
            SpendKind::Transfer => write!(f, "transfer"),
            SpendKind::Clawback => write!(f, "clawback"),
        }
    }
}

/// The revealed data unlocking one coin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendSolution {
    /// Identity of the party authorizing this spend
    pub spender: OwnerId,
    /// Declared outputs as (lock hash, amount) pairs
    pub outputs: Vec<(Hash, Amount)>,
    /// Additional co-signers this spend requires, if any
    pub extra_signers: Vec<OwnerId>,
    /// Compact commitment of the predecessor spend in the ring
    pub prev_commitment: Hash,
    /// Compact commitment of this spend
    pub own_commitment: Hash,
    /// Compact commitment of the successor spend in the ring
    pub next_commitment: Hash,
    /// Running subtotal threaded through the ring at this spend
    pub subtotal: i64,
    /// The effect this spend has on the coin's lineage
    pub kind: SpendKind,
}

/// The revealed program and data used to unlock one coin.
///
/// Immutable once signed; consumed by the external verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendDescriptor {
    /// The coin being spent
    pub coin: Coin,
    /// The revealed locking program matching the coin's lock hash
    pub locking_program: LockingProgram,
    /// The revealed data
    pub solution: SpendSolution,
}

impl SpendDescriptor {
    /// The delta this spend contributes: input value minus declared outputs.
    pub fn delta(&self) -> i128 {
        let out: i128 = self.solution.outputs.iter().map(|(_, a)| *a as i128).sum();
        self.coin.value as i128 - out
    }
}

/// Compact per-spend commitment referenced by ring neighbors: the hash of
/// the spent coin's id and its declared outputs. Neighbors reference this,
/// not the full spend, to keep the revealed data small.
pub(crate) fn neighbor_commitment(coin_id: Hash, outputs: &[(Hash, Amount)]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(coin_id);

    let mut count = [0u8; 8];
    LittleEndian::write_u64(&mut count, outputs.len() as u64);
    hasher.update(count);

    for (lock_hash, amount) in outputs {
        hasher.update(lock_hash);
        let mut amount_bytes = [0u8; 8];
        LittleEndian::write_u64(&mut amount_bytes, *amount);
        hasher.update(amount_bytes);
    }

    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Arranges `spendables` into a spend ring and emits unsigned descriptors.
///
/// `payments[i]` is the declared output list of `spendables[i]`; the two
/// slices must have the same length, and at least one coin is required. The
/// caller's ordering is preserved in the output. Before any descriptor is
/// produced the global conservation check runs: the per-coin deltas must sum
/// to zero or the whole construction fails with
/// [`CoreError::ValueImbalance`]. The on-chain template additionally
/// enforces the pairwise subtotal rule, so an unbalanced bundle that somehow
/// escaped this check would still be rejected at evaluation time.
///
/// For a single coin the ring degenerates to a self-loop (prev == next ==
/// self); only the indexing differs, not the formula.
pub fn build_spend_descriptors(
    spendables: &[SpendableCoin],
    payments: &[Vec<Payment>],
    template: &LockTemplate,
    spender: OwnerId,
    extra_signers: &[OwnerId],
) -> Result<Vec<SpendDescriptor>, CoreError> {
    let n = spendables.len();
    if n == 0 {
        return Err(CoreError::LengthMismatch {
            what: "spendable coins",
            expected: 1,
            actual: 0,
        });
    }
    if payments.len() != n {
        return Err(CoreError::LengthMismatch {
            what: "payment lists",
            expected: n,
            actual: payments.len(),
        });
    }

    // Resolve every declared output to its lock hash up front; this also
    // surfaces malformed receiver lineages before anything is built.
    let mut outputs: Vec<Vec<(Hash, Amount)>> = Vec::with_capacity(n);
    for payment_list in payments {
        let resolved = payment_list
            .iter()
            .map(|p| (lock_hash_for_lineage(template, &p.receiver), p.amount))
            .collect();
        outputs.push(resolved);
    }

    // Global conservation check, before any descriptor is produced
    let mut deltas: Vec<i128> = Vec::with_capacity(n);
    for (spendable, outs) in spendables.iter().zip(&outputs) {
        let out_sum: i128 = outs.iter().map(|(_, a)| *a as i128).sum();
        deltas.push(spendable.coin.value as i128 - out_sum);
    }
    let net: i128 = deltas.iter().sum();
    if net != 0 {
        return Err(CoreError::ValueImbalance { net });
    }

    let subtotals = subtotals_for_deltas(&deltas)?;

    let commitments: Vec<Hash> = spendables
        .iter()
        .zip(&outputs)
        .map(|(s, outs)| neighbor_commitment(s.coin.coin_id(), outs))
        .collect();

    let mut descriptors = Vec::with_capacity(n);
    for i in 0..n {
        let prev = (i + n - 1) % n;
        let next = (i + 1) % n;

        let solution = SpendSolution {
            spender,
            outputs: outputs[i].clone(),
            extra_signers: extra_signers.to_vec(),
            prev_commitment: commitments[prev],
            own_commitment: commitments[i],
            next_commitment: commitments[next],
            subtotal: subtotals[i] as i64,
            kind: SpendKind::classify(&spendables[i].lineage, &payments[i]),
        };

        descriptors.push(SpendDescriptor {
            coin: spendables[i].coin.clone(),
            locking_program: locking_program_for_lineage(template, &spendables[i].lineage),
            solution,
        });
    }

    Ok(descriptors)
}

/// An ordered collection of spend descriptors plus one aggregate signature.
///
/// Immutable once assembled; this is the unit handed to the external
/// verifier for evaluation and to the submission collaborator for broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendBundle {
    /// The spends, in the order the caller supplied them
    pub spends: Vec<SpendDescriptor>,
    /// The aggregate signature authorizing every signed spend
    pub aggregate_signature: AggregateSignature,
}

impl SpendBundle {
    /// Assembles a bundle from descriptors and an aggregate signature.
    pub fn new(spends: Vec<SpendDescriptor>, aggregate_signature: AggregateSignature) -> Self {
        Self {
            spends,
            aggregate_signature,
        }
    }

    /// Computes the hash identifying this bundle.
    pub fn bundle_id(&self) -> Hash {
        let mut hasher = Sha256::new();

        let mut count = [0u8; 8];
        LittleEndian::write_u64(&mut count, self.spends.len() as u64);
        hasher.update(count);

        for spend in &self.spends {
            hasher.update(spend.coin.coin_id());
            hasher.update(spend.solution.own_commitment);
        }
        for signature in self.aggregate_signature.signatures() {
            hasher.update(signature.0);
        }

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// The coins this bundle creates, parented by the coins it spends.
    pub fn additions(&self) -> Vec<Coin> {
        let mut coins = Vec::new();
        for spend in &self.spends {
            let parent_id = spend.coin.coin_id();
            for (lock_hash, amount) in &spend.solution.outputs {
                coins.push(Coin::new(parent_id, *lock_hash, *amount));
            }
        }
        coins
    }

    /// The coins this bundle consumes.
    pub fn removals(&self) -> Vec<Coin> {
        self.spends.iter().map(|s| s.coin.clone()).collect()
    }
}

/// Builds the one-spend bundle minting a coin locked to `lineage` from an
/// anyone-can-spend parent coin.
///
/// The whole parent value is minted, so `amount` must equal the parent's
/// value. The bundle carries the explicit null aggregate signature: the
/// parent's lock requires no signer.
pub fn issue_genesis(
    template: &LockTemplate,
    parent: &Coin,
    lineage: &Lineage,
    amount: Amount,
) -> Result<SpendBundle, CoreError> {
    if amount != parent.value {
        return Err(CoreError::ValueImbalance {
            net: parent.value as i128 - amount as i128,
        });
    }

    let outputs = vec![(lock_hash_for_lineage(template, lineage), amount)];
    let commitment = neighbor_commitment(parent.coin_id(), &outputs);

    let solution = SpendSolution {
        spender: lineage.owner(),
        outputs,
        extra_signers: Vec::new(),
        // A single spend is its own ring neighbor
        prev_commitment: commitment,
        own_commitment: commitment,
        next_commitment: commitment,
        subtotal: 0,
        kind: SpendKind::Mint,
    };

    let descriptor = SpendDescriptor {
        coin: parent.clone(),
        // Binds the minted lineage; the parent itself is anyone-can-spend
        locking_program: locking_program_for_lineage(template, lineage),
        solution,
    };

    Ok(SpendBundle::new(
        vec![descriptor],
        AggregateSignature::NULL,
    ))
}

//! Spend-message signing and signature aggregation.
//!
//! Each spending party signs the hash of (its spend's declared outputs, the
//! identity of the coin being consumed, a domain-separation tag scoping the
//! signature to one ledger instance). The binding means a signature cannot
//! be replayed against a different coin or a different output set. The
//! per-party signatures are combined into one aggregate attached to the
//! bundle; the aggregate is valid iff every constituent verifies against its
//! own message. Anyone-can-spend paths carry the explicit null aggregate.

use crate::bundle::{neighbor_commitment, SpendBundle, SpendDescriptor, SpendKind};
use crate::commitment::lock_hash_for_lineage_hash;
use crate::errors::CoreError;
use crate::types::{Amount, Hash, LockTemplate, Signature};
use byteorder::{ByteOrder, LittleEndian};
use ed25519_dalek::{Keypair, PublicKey, Signer, Verifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Whether a bundle with no signatures is accepted at construction time.
///
/// One version of the ancestry of this code passed unsigned bundles through
/// silently and let the external verifier reject them at evaluation time;
/// the permissive variant reproduces that, the required variant fails fast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignaturePolicy {
    /// Pass an unsigned bundle through; the external verifier rejects it
    /// at evaluation time if a signature was required.
    Permissive,
    /// Reject an unsigned bundle at construction time.
    Required,
}

/// A single signature validating several independent signer/message pairs.
///
/// The aggregate is the ordered collection of per-party signatures and is
/// valid iff every constituent verifies against its own message. The empty
/// aggregate is the well-known null value used on anyone-can-spend paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSignature {
    /// Constituent signatures, in spend order
    signatures: Vec<Signature>,
}

impl AggregateSignature {
    /// The well-known null value used where no signer is required.
    pub const NULL: AggregateSignature = AggregateSignature {
        signatures: Vec::new(),
    };

    /// Whether this is the null aggregate.
    pub fn is_null(&self) -> bool {
        self.signatures.is_empty()
    }

    /// The number of constituent signatures.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether the aggregate carries no signatures.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// The constituent signatures, in spend order.
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }
}

/// Combines independent signatures into one aggregate signature.
pub fn aggregate(signatures: Vec<Signature>) -> AggregateSignature {
    AggregateSignature { signatures }
}

/// Builds the message a spending party signs: the hash of the spend's
/// declared outputs, the identity of the coin being consumed, and the
/// caller-supplied domain-separation tag.
pub fn spend_message(outputs: &[(Hash, Amount)], coin_id: Hash, domain_tag: Hash) -> Hash {
    let mut hasher = Sha256::new();

    let mut count = [0u8; 8];
    LittleEndian::write_u64(&mut count, outputs.len() as u64);
    hasher.update(count);
    for (lock_hash, amount) in outputs {
        hasher.update(lock_hash);
        let mut amount_bytes = [0u8; 8];
        LittleEndian::write_u64(&mut amount_bytes, *amount);
        hasher.update(amount_bytes);
    }

    hasher.update(coin_id);
    hasher.update(domain_tag);

    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Signs one spend's message with the party's key.
pub fn sign_spend(keypair: &Keypair, descriptor: &SpendDescriptor, domain_tag: Hash) -> Signature {
    let message = spend_message(
        &descriptor.solution.outputs,
        descriptor.coin.coin_id(),
        domain_tag,
    );
    let signature = keypair.sign(&message);
    Signature(signature.to_bytes())
}

/// Signs every non-mint spend with `keypair` and attaches the aggregate.
///
/// This is the single-party path. Multi-party bundles collect one signature
/// per party via [`sign_spend`]/[`spend_message`] and combine them with
/// [`aggregate`]; spends declaring extra co-signers always take that path.
pub fn sign_bundle(
    descriptors: Vec<SpendDescriptor>,
    keypair: &Keypair,
    domain_tag: Hash,
    policy: SignaturePolicy,
) -> Result<SpendBundle, CoreError> {
    let mut signatures = Vec::new();
    for descriptor in &descriptors {
        if descriptor.solution.kind != SpendKind::Mint {
            signatures.push(sign_spend(keypair, descriptor, domain_tag));
        }
    }

    if signatures.is_empty() {
        return unsigned_bundle(descriptors, policy);
    }

    Ok(SpendBundle::new(descriptors, aggregate(signatures)))
}

/// Builds a bundle carrying the null aggregate signature.
///
/// Under [`SignaturePolicy::Required`] this fails with
/// [`CoreError::MissingSignatures`]; under [`SignaturePolicy::Permissive`]
/// the unsigned bundle is constructed and left for the external verifier to
/// judge.
pub fn unsigned_bundle(
    descriptors: Vec<SpendDescriptor>,
    policy: SignaturePolicy,
) -> Result<SpendBundle, CoreError> {
    let signed_spends = descriptors
        .iter()
        .filter(|d| d.solution.kind != SpendKind::Mint)
        .count();
    if policy == SignaturePolicy::Required && signed_spends > 0 {
        return Err(CoreError::MissingSignatures {
            expected: signed_spends,
        });
    }
    Ok(SpendBundle::new(descriptors, AggregateSignature::NULL))
}

/// Checks a bundle the way the external verifier will.
///
/// Per spend: the revealed locking program must produce the spent coin's
/// lock hash (for mints, the minted output must match the revealed
/// program), the ring linkage must reference the true neighbor commitments,
/// and the pairwise subtotal rule must hold. Then the aggregate signature
/// must carry exactly one valid constituent per signed spend (plus one per
/// declared co-signer), in spend order.
///
/// This mirrors the trusted external verifier for local sanity checking; it
/// does not replace it.
pub fn verify_bundle(
    bundle: &SpendBundle,
    template: &LockTemplate,
    domain_tag: Hash,
) -> Result<(), CoreError> {
    let n = bundle.spends.len();
    if n == 0 {
        return Err(CoreError::VerificationFailed("empty bundle".to_string()));
    }

    let commitments: Vec<Hash> = bundle
        .spends
        .iter()
        .map(|s| neighbor_commitment(s.coin.coin_id(), &s.solution.outputs))
        .collect();

    for (i, spend) in bundle.spends.iter().enumerate() {
        let revealed_lock = lock_hash_for_lineage_hash(
            template,
            spend.locking_program.lineage.lineage_hash(),
        );

        match spend.solution.kind {
            SpendKind::Mint => {
                // The revealed program binds the minted lineage, not the
                // anyone-can-spend parent.
                let minted = spend
                    .solution
                    .outputs
                    .iter()
                    .any(|(lock, _)| *lock == revealed_lock);
                if !minted {
                    return Err(CoreError::VerificationFailed(format!(
                        "mint at spend {} does not create the revealed lineage's coin",
                        i
                    )));
                }
            }
            SpendKind::Transfer | SpendKind::Clawback => {
                if revealed_lock != spend.coin.lock_hash {
                    return Err(CoreError::VerificationFailed(format!(
                        "revealed lineage does not match the lock of spend {}",
                        i
                    )));
                }
            }
        }

        let prev = (i + n - 1) % n;
        let next = (i + 1) % n;
        if spend.solution.own_commitment != commitments[i]
            || spend.solution.prev_commitment != commitments[prev]
            || spend.solution.next_commitment != commitments[next]
        {
            return Err(CoreError::VerificationFailed(format!(
                "ring linkage broken at spend {}",
                i
            )));
        }

        let next_subtotal = bundle.spends[next].solution.subtotal as i128;
        if spend.solution.subtotal as i128 + spend.delta() != next_subtotal {
            return Err(CoreError::VerificationFailed(format!(
                "conservation violated at spend {}",
                i
            )));
        }
    }

    verify_aggregate(bundle, domain_tag)
}

fn verify_aggregate(bundle: &SpendBundle, domain_tag: Hash) -> Result<(), CoreError> {
    let expected: usize = bundle
        .spends
        .iter()
        .map(|s| match s.solution.kind {
            SpendKind::Mint => 0,
            _ => 1 + s.solution.extra_signers.len(),
        })
        .sum();

    if bundle.aggregate_signature.is_null() {
        if expected == 0 {
            return Ok(());
        }
        return Err(CoreError::SignatureVerificationFailed(format!(
            "bundle is unsigned but {} signed spends were expected",
            expected
        )));
    }

    if bundle.aggregate_signature.len() != expected {
        return Err(CoreError::SignatureVerificationFailed(format!(
            "aggregate carries {} signatures, expected {}",
            bundle.aggregate_signature.len(),
            expected
        )));
    }

    let mut signatures = bundle.aggregate_signature.signatures().iter();
    for spend in &bundle.spends {
        if spend.solution.kind == SpendKind::Mint {
            continue;
        }

        let message = spend_message(&spend.solution.outputs, spend.coin.coin_id(), domain_tag);
        let mut signers = Vec::with_capacity(1 + spend.solution.extra_signers.len());
        signers.push(spend.solution.spender);
        signers.extend_from_slice(&spend.solution.extra_signers);

        for signer in signers {
            let signature = signatures
                .next()
                .expect("signature count was checked above");
            let public_key = PublicKey::from_bytes(&signer).map_err(|e| {
                CoreError::SignatureVerificationFailed(format!("invalid signer key: {}", e))
            })?;
            let signature = ed25519_dalek::Signature::from_bytes(&signature.0).map_err(|e| {
                CoreError::SignatureVerificationFailed(format!("invalid signature format: {}", e))
            })?;
            public_key.verify(&message, &signature).map_err(|e| {
                CoreError::SignatureVerificationFailed(format!(
                    "constituent signature rejected: {}",
                    e
                ))
            })?;
        }
    }

    Ok(())
}

//! Core types for lineage-bound coins.

use crate::errors::CoreError;
use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte owner identity, the bytes of an ed25519 public key.
pub type OwnerId = [u8; 32];

/// A 32-byte hash value.
pub type Hash = [u8; 32];

/// Coin value, represented as a 64-bit unsigned integer.
pub type Amount = u64;

/// Signature, represented as a 64-byte array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

// Implement serialization for Signature
impl serde::Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as a byte array
        serializer.serialize_bytes(&self.0)
    }
}

// Implement deserialization for Signature
impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SignatureVisitor;

        impl<'de> serde::de::Visitor<'de> for SignatureVisitor {
            type Value = Signature;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a 64-byte signature")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.len() != 64 {
                    return Err(E::custom(format!(
                        "invalid signature length: {} (expected 64)",
                        v.len()
                    )));
                }

                let mut signature = [0u8; 64];
                signature.copy_from_slice(v);
                Ok(Signature(signature))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut signature = [0u8; 64];
                for i in 0..64 {
                    signature[i] = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(Signature(signature))
            }
        }

        deserializer.deserialize_bytes(SignatureVisitor)
    }
}

/// Opaque identity of the locking program shared by every coin of this kind.
///
/// The template is never evaluated here; only its hash participates in
/// commitment derivation. Evaluation belongs to the external verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTemplate {
    /// Raw bytes of the locking program
    bytes: Vec<u8>,
}

impl LockTemplate {
    /// Creates a template from the locking program's raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The raw bytes of the locking program.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Computes the hash identifying this template.
    pub fn template_hash(&self) -> Hash {
        let mut hasher = Sha256::new();

        let mut len_bytes = [0u8; 8];
        LittleEndian::write_u64(&mut len_bytes, self.bytes.len() as u64);
        hasher.update(len_bytes);
        hasher.update(&self.bytes);

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }
}

/// An ordered, non-empty ownership chain: oldest ancestor first, current
/// owner last.
///
/// Handoffs only ever append ([`Lineage::child`]); the one sanctioned way to
/// shorten a chain is truncation back to an ancestor ([`Lineage::truncated`]),
/// which the locking template recognizes as a clawback. Two lineages are the
/// same logical chain iff their canonical byte serializations are equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lineage {
    owners: Vec<OwnerId>,
}

impl Lineage {
    /// Creates a lineage from an ordered owner chain.
    ///
    /// Every coin must have at least a genesis owner, so an empty chain is
    /// rejected with [`CoreError::MalformedLineage`].
    pub fn new(owners: Vec<OwnerId>) -> Result<Self, CoreError> {
        if owners.is_empty() {
            return Err(CoreError::MalformedLineage(
                "a lineage must have at least a genesis owner".to_string(),
            ));
        }
        Ok(Self { owners })
    }

    /// Creates the single-owner lineage of a freshly minted coin.
    pub fn genesis(owner: OwnerId) -> Self {
        Self { owners: vec![owner] }
    }

    /// Returns the lineage produced by handing ownership to `owner`.
    pub fn child(&self, owner: OwnerId) -> Self {
        let mut owners = self.owners.clone();
        owners.push(owner);
        Self { owners }
    }

    /// Returns the lineage truncated back to its first `depth` owners.
    ///
    /// `depth` must be between 1 and the current depth; anything else is a
    /// malformed chain.
    pub fn truncated(&self, depth: usize) -> Result<Self, CoreError> {
        if depth == 0 || depth > self.owners.len() {
            return Err(CoreError::MalformedLineage(format!(
                "cannot truncate a lineage of depth {} to depth {}",
                self.owners.len(),
                depth
            )));
        }
        Ok(Self {
            owners: self.owners[..depth].to_vec(),
        })
    }

    /// The current owner: the last identity in the chain.
    pub fn owner(&self) -> OwnerId {
        *self.owners.last().expect("lineage is never empty")
    }

    /// The number of owners in the chain.
    pub fn depth(&self) -> usize {
        self.owners.len()
    }

    /// The full owner chain, oldest ancestor first.
    pub fn owners(&self) -> &[OwnerId] {
        &self.owners
    }

    /// Whether `owner` appears anywhere in the chain.
    pub fn contains(&self, owner: &OwnerId) -> bool {
        self.owners.contains(owner)
    }

    /// Whether this lineage is a proper ancestor prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Lineage) -> bool {
        self.owners.len() < other.owners.len() && other.owners[..self.owners.len()] == self.owners
    }

    /// Canonical byte serialization: owner count followed by the owner keys
    /// in order. Identical logical chains always produce identical bytes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + 32 * self.owners.len());
        let mut count = [0u8; 8];
        LittleEndian::write_u64(&mut count, self.owners.len() as u64);
        bytes.extend_from_slice(&count);
        for owner in &self.owners {
            bytes.extend_from_slice(owner);
        }
        bytes
    }

    /// Computes the hash of the canonical serialization.
    pub fn lineage_hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }
}

impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tips: Vec<String> = self
            .owners
            .iter()
            .map(|o| hex::encode(&o[..4]))
            .collect();
        write!(f, "Lineage[{}]", tips.join(" -> "))
    }
}

/// A ledger coin: the transaction that created it, its locking-condition
/// hash, and its value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Id of the coin (or bundle) that created this coin
    pub parent_id: Hash,
    /// The locking-condition commitment this coin is bound to
    pub lock_hash: Hash,
    /// The coin's value
    pub value: Amount,
}

impl Coin {
    /// Creates a new coin record.
    pub fn new(parent_id: Hash, lock_hash: Hash, value: Amount) -> Self {
        Self {
            parent_id,
            lock_hash,
            value,
        }
    }

    /// Computes the id of this coin: the hash of its parent, lock, and value.
    pub fn coin_id(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.parent_id);
        hasher.update(self.lock_hash);

        let mut value_bytes = [0u8; 8];
        LittleEndian::write_u64(&mut value_bytes, self.value);
        hasher.update(value_bytes);

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Coin {{ id: {}, lock: {}, value: {} }}",
            hex::encode(self.coin_id()),
            hex::encode(self.lock_hash),
            self.value
        )
    }
}

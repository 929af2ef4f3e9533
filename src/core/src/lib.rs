//! Bundle-construction core for lineage-bound coins.
//!
//! This crate builds spend bundles for coins whose locking condition commits
//! to an ownership chain ("lineage"). Spends are arranged in a ring so that a
//! verifier inspecting one spend at a time can still check that value is
//! conserved across the whole bundle, and every output coin's lock is derived
//! from the receiver's lineage, so coins cannot be grafted from one chain
//! onto another.

pub mod bundle;
pub mod commitment;
pub mod conservation;
pub mod errors;
pub mod signing;
pub mod types;

// Re-export commonly used types
pub use bundle::{Payment, SpendBundle, SpendDescriptor, SpendableCoin};
pub use commitment::LockingProgram;
pub use errors::CoreError;
pub use signing::{AggregateSignature, SignaturePolicy};
pub use types::{Amount, Coin, Hash, Lineage, LockTemplate, OwnerId};

//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur during bundle construction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Error when a lineage is empty or otherwise invalid.
    #[error("Malformed lineage: {0}")]
    MalformedLineage(String),

    /// Error when input array lengths disagree across coins, outputs, or amounts.
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Which inputs disagreed
        what: &'static str,
        /// The expected length
        expected: usize,
        /// The actual length
        actual: usize,
    },

    /// Error when the deltas of a bundle do not sum to zero.
    #[error("Value imbalance: deltas sum to {net}, expected 0")]
    ValueImbalance {
        /// The net value created (positive) or destroyed (negative)
        net: i128,
    },

    /// Error when a delta or subtotal exceeds the integer width the locking
    /// template evaluates.
    #[error("Amount out of range: {value} does not fit a 64-bit signed integer")]
    AmountOutOfRange {
        /// The offending value
        value: i128,
    },

    /// Error when a signed bundle was requested but no signatures were supplied.
    #[error("Missing signatures: {expected} signed spends, 0 signatures supplied")]
    MissingSignatures {
        /// How many spends needed a signature
        expected: usize,
    },

    /// Error when a spend's revealed data fails local verification.
    #[error("Spend verification failed: {0}")]
    VerificationFailed(String),

    /// Error when a signature verification fails.
    #[error("Signature verification failed: {0}")]
    SignatureVerificationFailed(String),
}

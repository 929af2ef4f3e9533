//! Error types for the wallet crate.

use strand_core::CoreError;
use thiserror::Error;

/// Errors that can occur in the lineage ledger.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Error when coin selection cannot reach the requested amount. The
    /// confirmed total may well be sufficient while coins are reserved by
    /// pending spends; the caller retries once those settle.
    #[error("Insufficient spendable balance: required {required}, spendable {spendable} (confirmed {confirmed})")]
    InsufficientSpendableBalance {
        /// The requested amount
        required: u64,
        /// What selection could actually reach
        spendable: u64,
        /// The confirmed total for the commitment, including reserved coins
        confirmed: u64,
    },

    /// Error when an operation references a commitment hash that was never
    /// registered with this ledger.
    #[error("Unrecognized commitment hash: {0}")]
    UnrecognizedCommitment(String),

    /// Error propagated from bundle construction.
    #[error("Bundle construction failed: {0}")]
    Core(#[from] CoreError),
}

//! Wallet-facing lineage ledger for lineage-bound coins.
//!
//! Balances are bucketed by the commitment hash of each distinct lineage. A
//! registry maps commitment hashes back to the lineages that produce them;
//! coins locked to unregistered hashes stay invisible, which is what keeps
//! distinct lineages' balances from bleeding into each other.

pub mod errors;
pub mod ledger;
pub mod registry;

// Re-export commonly used types
pub use errors::WalletError;
pub use ledger::{CoinRecord, LedgerSnapshot, LineageLedger, PendingSpend, TransactionRecord};
pub use registry::{DerivationRecord, LineageRegistry};

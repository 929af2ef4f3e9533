//! Error types for the CLI wallet.

use std::error::Error as StdError;
use std::fmt;

/// Errors that can occur in the CLI wallet.
#[derive(Debug)]
pub enum CliError {
    /// Error when a file operation fails.
    FileError(std::io::Error),

    /// Error when JSON serialization or deserialization fails.
    JsonError(serde_json::Error),

    /// Error when a BIP32 operation fails.
    Bip32Error(bip32::Error),

    /// Error when an ed25519 operation fails.
    Ed25519Error(ed25519_dalek::SignatureError),

    /// Error from the lineage ledger.
    LedgerError(strand_wallet::WalletError),

    /// Error from bundle construction.
    CoreError(strand_core::CoreError),

    /// Error when a wallet file operation fails.
    WalletError(String),

    /// Error when a command argument cannot be parsed.
    InvalidArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileError(e) => write!(f, "File error: {}", e),
            CliError::JsonError(e) => write!(f, "JSON error: {}", e),
            CliError::Bip32Error(e) => write!(f, "BIP32 error: {}", e),
            CliError::Ed25519Error(e) => write!(f, "Ed25519 error: {}", e),
            CliError::LedgerError(e) => write!(f, "Ledger error: {}", e),
            CliError::CoreError(e) => write!(f, "Bundle error: {}", e),
            CliError::WalletError(msg) => write!(f, "Wallet error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl StdError for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::FileError(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        CliError::JsonError(error)
    }
}

impl From<bip32::Error> for CliError {
    fn from(error: bip32::Error) -> Self {
        CliError::Bip32Error(error)
    }
}

impl From<ed25519_dalek::SignatureError> for CliError {
    fn from(error: ed25519_dalek::SignatureError) -> Self {
        CliError::Ed25519Error(error)
    }
}

impl From<strand_wallet::WalletError> for CliError {
    fn from(error: strand_wallet::WalletError) -> Self {
        CliError::LedgerError(error)
    }
}

impl From<strand_core::CoreError> for CliError {
    fn from(error: strand_core::CoreError) -> Self {
        CliError::CoreError(error)
    }
}

//! Configuration for the CLI wallet.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use strand_core::{Hash, LockTemplate};

use crate::errors::CliError;

/// The default locking-template bytes shared by every coin of this kind.
const DEFAULT_TEMPLATE: &[u8] = b"strand-lineage-lock-v1";

/// Configuration for the CLI wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// The ledger instance signatures are scoped to
    pub network: String,
    /// Hex-encoded bytes of the locking template
    pub template: String,
    /// Directory finished bundles are written to for submission
    pub outbox: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        let mut outbox = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        outbox.push("strand");
        outbox.push("outbox");
        Self {
            network: "strand-mainnet".to_string(),
            template: hex::encode(DEFAULT_TEMPLATE),
            outbox: outbox.to_string_lossy().to_string(),
        }
    }
}

impl WalletConfig {
    /// Loads configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The locking template coins of this wallet are bound to.
    pub fn lock_template(&self) -> Result<LockTemplate, CliError> {
        let bytes = hex::decode(&self.template)
            .map_err(|e| CliError::InvalidArgument(format!("invalid template hex: {}", e)))?;
        Ok(LockTemplate::new(bytes))
    }

    /// The domain-separation tag scoping signatures to this network.
    pub fn domain_tag(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.network.as_bytes());

        let result = hasher.finalize();
        let mut tag = [0u8; 32];
        tag.copy_from_slice(&result);
        tag
    }
}

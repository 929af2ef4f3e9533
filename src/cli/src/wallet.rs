//! File-backed wallet state for the CLI.

use crate::errors::CliError;
use bip32::{Mnemonic, XPrv};
use ed25519_dalek::{Keypair, PublicKey, SecretKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use strand_core::OwnerId;
use strand_wallet::LedgerSnapshot;

/// The on-disk wallet: seed material plus the ledger snapshot carried
/// between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletStore {
    /// The BIP39 mnemonic for the wallet
    mnemonic: String,
    /// The current account index
    account_index: u32,
    /// Ledger state: registered lineages, known coins, pending spends
    pub ledger: LedgerSnapshot,
    /// Counter of genesis issuances, used to derive fresh parent ids
    pub issued: u64,
}

impl WalletStore {
    /// Creates a new wallet with a random mnemonic.
    pub fn new() -> Result<Self, CliError> {
        let mnemonic = Mnemonic::random(OsRng, Default::default());

        Ok(Self {
            mnemonic: mnemonic.phrase().to_string(),
            account_index: 0,
            ledger: LedgerSnapshot::default(),
            issued: 0,
        })
    }

    /// Loads a wallet from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let wallet = serde_json::from_str(&contents)?;
        Ok(wallet)
    }

    /// Saves the wallet to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let contents = serde_json::to_string_pretty(self)?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        file.write_all(contents.as_bytes())?;

        Ok(())
    }

    /// Gets the mnemonic for the wallet.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Gets the keypair for the current account.
    pub fn keypair(&self) -> Result<Keypair, CliError> {
        // Parse the mnemonic
        let mnemonic = Mnemonic::new(self.mnemonic.as_str(), Default::default())?;

        // Derive the seed
        let seed = mnemonic.to_seed("");

        // Derive the private key using BIP32
        let root = XPrv::derive_from_path(
            seed,
            &format!("m/44'/0'/{}'", self.account_index).parse()?,
        )?;

        // Hash down to an ed25519 seed
        let secret = root.to_bytes();
        let mut hasher = Sha256::new();
        hasher.update(secret);
        let result = hasher.finalize();

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&result);

        let secret_key = SecretKey::from_bytes(&seed)?;
        let public_key = PublicKey::from(&secret_key);

        Ok(Keypair {
            secret: secret_key,
            public: public_key,
        })
    }

    /// Gets the owner identity for the current account: the public key bytes.
    pub fn owner_id(&self) -> Result<OwnerId, CliError> {
        let keypair = self.keypair()?;
        Ok(keypair.public.to_bytes())
    }
}

//! The lineage ledger: balance bookkeeping bucketed by lineage commitment.
//!
//! The ledger never touches the network or disk; the caller feeds it
//! already-materialized coin data (`observe_coin`, `settle_bundle`) and
//! reads balances back out. All mutations serialize behind one lock per
//! ledger instance; balance reads return owned snapshots.

use crate::errors::WalletError;
use crate::registry::{DerivationRecord, LineageRegistry};
use ed25519_dalek::Keypair;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;
use strand_core::bundle::{build_spend_descriptors, Payment, SpendableCoin};
use strand_core::signing::{sign_bundle, SignaturePolicy};
use strand_core::{Amount, Coin, CoreError, Hash, Lineage, LockTemplate, SpendBundle};
use tracing::{debug, info};

/// A coin known to the ledger, with its confirmation and spend status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinRecord {
    /// The coin itself
    pub coin: Coin,
    /// Whether the external ledger has finalized the coin
    pub confirmed: bool,
    /// Whether the coin has been spent
    pub spent: bool,
}

/// A bundle generated locally but not yet finalized by the external ledger.
/// Its removals stay reserved until it settles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSpend {
    /// Id of the in-flight bundle
    pub bundle_id: Hash,
    /// Coins the bundle will create
    pub additions: Vec<Coin>,
    /// Ids of the coins the bundle consumes
    pub removals: Vec<Hash>,
}

/// Record of one generated transaction, returned to the caller for handoff
/// to the submission collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The signed bundle
    pub bundle: SpendBundle,
    /// Coins the bundle creates
    pub additions: Vec<Coin>,
    /// Coins the bundle consumes
    pub removals: Vec<Coin>,
}

/// Serializable snapshot of a ledger's state, used by file-backed callers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Registered derived-address records
    pub records: Vec<DerivationRecord>,
    /// Known coins
    pub coins: Vec<CoinRecord>,
    /// In-flight spends
    pub pending: Vec<PendingSpend>,
}

struct LedgerState {
    registry: LineageRegistry,
    coins: BTreeMap<Hash, CoinRecord>,
    pending: Vec<PendingSpend>,
}

/// Wallet-facing ledger bucketing balances by lineage commitment.
pub struct LineageLedger {
    template: LockTemplate,
    state: RwLock<LedgerState>,
}

impl LineageLedger {
    /// Creates an empty ledger for coins of the given locking template.
    pub fn new(template: LockTemplate) -> Self {
        Self {
            template,
            state: RwLock::new(LedgerState {
                registry: LineageRegistry::new(),
                coins: BTreeMap::new(),
                pending: Vec::new(),
            }),
        }
    }

    /// Rebuilds a ledger from a stored snapshot.
    pub fn from_snapshot(template: LockTemplate, snapshot: LedgerSnapshot) -> Self {
        let coins = snapshot
            .coins
            .into_iter()
            .map(|record| (record.coin.coin_id(), record))
            .collect();
        Self {
            template,
            state: RwLock::new(LedgerState {
                registry: LineageRegistry::from_records(snapshot.records),
                coins,
                pending: snapshot.pending,
            }),
        }
    }

    /// Takes a serializable snapshot of the current state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read().unwrap();
        LedgerSnapshot {
            records: state.registry.records().to_vec(),
            coins: state.coins.values().cloned().collect(),
            pending: state.pending.clone(),
        }
    }

    /// The locking template this ledger tracks coins of.
    pub fn template(&self) -> &LockTemplate {
        &self.template
    }

    /// Registers a lineage so coins locked to its commitment hash become
    /// visible, and returns that hash.
    pub fn register_lineage(&self, lineage: Lineage) -> Hash {
        let mut state = self.state.write().unwrap();
        let lock_hash = state.registry.register(&self.template, lineage);
        info!("registered lineage under {}", hex::encode(lock_hash));
        lock_hash
    }

    /// Looks up the lineage registered under a commitment hash.
    pub fn lineage_for(&self, lock_hash: &Hash) -> Option<Lineage> {
        self.state
            .read()
            .unwrap()
            .registry
            .lineage_for(lock_hash)
            .cloned()
    }

    /// Whether a commitment hash has been registered.
    pub fn is_registered(&self, lock_hash: &Hash) -> bool {
        self.state.read().unwrap().registry.is_registered(lock_hash)
    }

    /// Records a coin reported by the external ledger. Coins locked to
    /// unregistered commitments are stored too: they become visible if
    /// their lineage is registered later.
    pub fn observe_coin(&self, coin: Coin, confirmed: bool) {
        let mut state = self.state.write().unwrap();
        let coin_id = coin.coin_id();
        debug!(
            "observing coin {} (confirmed: {})",
            hex::encode(coin_id),
            confirmed
        );
        let record = state.coins.entry(coin_id).or_insert(CoinRecord {
            coin,
            confirmed,
            spent: false,
        });
        record.confirmed |= confirmed;
    }

    /// Marks a known coin as confirmed by the external ledger.
    pub fn mark_confirmed(&self, coin_id: &Hash) -> bool {
        let mut state = self.state.write().unwrap();
        match state.coins.get_mut(coin_id) {
            Some(record) => {
                record.confirmed = true;
                true
            }
            None => false,
        }
    }

    /// Records an in-flight bundle so its removals are reserved and its
    /// effect shows up in the unconfirmed balance.
    pub fn record_pending_bundle(&self, bundle: &SpendBundle) -> PendingSpend {
        let pending = PendingSpend {
            bundle_id: bundle.bundle_id(),
            additions: bundle.additions(),
            removals: bundle.removals().iter().map(|c| c.coin_id()).collect(),
        };
        let mut state = self.state.write().unwrap();
        info!(
            "tracking pending bundle {} ({} additions, {} removals)",
            hex::encode(pending.bundle_id),
            pending.additions.len(),
            pending.removals.len()
        );
        state.pending.push(pending.clone());
        pending
    }

    /// Applies a settled bundle: consumed coins become spent, created coins
    /// become confirmed, and the pending entry is dropped. Returns false if
    /// the bundle was not pending.
    pub fn settle_bundle(&self, bundle_id: &Hash) -> bool {
        let mut state = self.state.write().unwrap();
        let position = match state.pending.iter().position(|p| p.bundle_id == *bundle_id) {
            Some(position) => position,
            None => return false,
        };
        let pending = state.pending.remove(position);

        for removal in &pending.removals {
            if let Some(record) = state.coins.get_mut(removal) {
                record.spent = true;
            }
        }
        for addition in pending.additions {
            let coin_id = addition.coin_id();
            let record = state.coins.entry(coin_id).or_insert(CoinRecord {
                coin: addition,
                confirmed: true,
                spent: false,
            });
            record.confirmed = true;
        }

        info!("settled bundle {}", hex::encode(bundle_id));
        true
    }

    /// In-flight spends, oldest first.
    pub fn pending_spends(&self) -> Vec<PendingSpend> {
        self.state.read().unwrap().pending.clone()
    }

    /// Sums, per registered commitment hash, the value of all unspent
    /// confirmed coins. Coins locked to unregistered hashes belong to some
    /// other lineage entirely and are not counted.
    pub fn confirmed_balance(&self) -> BTreeMap<Hash, Amount> {
        let state = self.state.read().unwrap();
        confirmed_balance_inner(&state)
    }

    /// The confirmed balance adjusted by the additions and removals of
    /// spends not yet finalized by the external ledger, filtered to
    /// registered commitment hashes.
    pub fn unconfirmed_balance(&self) -> BTreeMap<Hash, Amount> {
        let state = self.state.read().unwrap();
        let mut balance = confirmed_balance_inner(&state);

        for pending in &state.pending {
            for removal in &pending.removals {
                if let Some(record) = state.coins.get(removal) {
                    if record.confirmed
                        && !record.spent
                        && state.registry.is_registered(&record.coin.lock_hash)
                    {
                        subtract(&mut balance, record.coin.lock_hash, record.coin.value);
                    }
                }
            }
            for addition in &pending.additions {
                if state.registry.is_registered(&addition.lock_hash) {
                    *balance.entry(addition.lock_hash).or_insert(0) += addition.value;
                }
            }
        }

        balance
    }

    /// Selects unspent confirmed coins locked to `lock_hash` reaching at
    /// least `amount`, excluding coins reserved by pending spends.
    ///
    /// Fails with [`WalletError::UnrecognizedCommitment`] for a hash that
    /// was never registered, and with
    /// [`WalletError::InsufficientSpendableBalance`] when reservations (or a
    /// genuinely short balance) make the request unsatisfiable; in the
    /// former case the caller retries once pending spends settle.
    pub fn select_coins(&self, lock_hash: &Hash, amount: Amount) -> Result<Vec<Coin>, WalletError> {
        let state = self.state.read().unwrap();
        select_coins_inner(&state, lock_hash, amount)
    }

    /// Builds, signs, and starts tracking a transfer out of the lineage
    /// registered under `source_lock_hash`.
    ///
    /// Coins are selected for the sum of `amounts`; when selection overshoots,
    /// the change is paid back to the source lineage. The first selected coin
    /// carries every declared output; the rest contribute their value through
    /// the ring. The bundle is recorded as pending, so its inputs are
    /// reserved until [`settle_bundle`](Self::settle_bundle) is called.
    pub fn generate_signed_spend(
        &self,
        amounts: &[Amount],
        receivers: &[Lineage],
        source_lock_hash: &Hash,
        keypair: &Keypair,
        domain_tag: Hash,
        policy: SignaturePolicy,
    ) -> Result<TransactionRecord, WalletError> {
        if amounts.len() != receivers.len() {
            return Err(CoreError::LengthMismatch {
                what: "payment amounts",
                expected: receivers.len(),
                actual: amounts.len(),
            }
            .into());
        }

        // The template evaluates 64-bit signed integers, so the requested
        // total must fit that width before selection even starts.
        let requested: i128 = amounts.iter().map(|&a| a as i128).sum();
        if requested > i64::MAX as i128 {
            return Err(CoreError::AmountOutOfRange { value: requested }.into());
        }
        let total = requested as Amount;

        // One critical section for select-and-reserve, so two concurrent
        // callers cannot pick the same coins.
        let mut state = self.state.write().unwrap();

        let source_lineage = state
            .registry
            .lineage_for(source_lock_hash)
            .cloned()
            .ok_or_else(|| WalletError::UnrecognizedCommitment(hex::encode(source_lock_hash)))?;

        let selected = select_coins_inner(&state, source_lock_hash, total)?;
        let selected_total: Amount = selected.iter().map(|c| c.value).sum();
        let change = selected_total - total;

        let spendables: Vec<SpendableCoin> = selected
            .into_iter()
            .map(|coin| SpendableCoin::new(coin, source_lineage.clone()))
            .collect();

        let mut first: Vec<Payment> = receivers
            .iter()
            .zip(amounts)
            .map(|(receiver, &amount)| Payment::new(receiver.clone(), amount))
            .collect();
        if change > 0 {
            first.push(Payment::new(source_lineage.clone(), change));
        }
        let mut payments = vec![first];
        payments.extend((1..spendables.len()).map(|_| Vec::new()));

        let spender = keypair.public.to_bytes();
        let descriptors =
            build_spend_descriptors(&spendables, &payments, &self.template, spender, &[])?;
        let bundle = sign_bundle(descriptors, keypair, domain_tag, policy)?;

        let additions = bundle.additions();
        let removals = bundle.removals();
        state.pending.push(PendingSpend {
            bundle_id: bundle.bundle_id(),
            additions: additions.clone(),
            removals: removals.iter().map(|c| c.coin_id()).collect(),
        });
        info!(
            "generated spend of {} from {} ({} inputs, change {})",
            total,
            hex::encode(source_lock_hash),
            bundle.spends.len(),
            change
        );

        Ok(TransactionRecord {
            bundle,
            additions,
            removals,
        })
    }
}

fn confirmed_balance_inner(state: &LedgerState) -> BTreeMap<Hash, Amount> {
    let mut balance = BTreeMap::new();
    for record in state.coins.values() {
        if record.confirmed
            && !record.spent
            && state.registry.is_registered(&record.coin.lock_hash)
        {
            *balance.entry(record.coin.lock_hash).or_insert(0) += record.coin.value;
        }
    }
    balance
}

fn subtract(balance: &mut BTreeMap<Hash, Amount>, lock_hash: Hash, value: Amount) {
    if let Some(entry) = balance.get_mut(&lock_hash) {
        *entry = entry.saturating_sub(value);
        if *entry == 0 {
            balance.remove(&lock_hash);
        }
    }
}

fn select_coins_inner(
    state: &LedgerState,
    lock_hash: &Hash,
    amount: Amount,
) -> Result<Vec<Coin>, WalletError> {
    if !state.registry.is_registered(lock_hash) {
        return Err(WalletError::UnrecognizedCommitment(hex::encode(lock_hash)));
    }

    let reserved: HashSet<Hash> = state
        .pending
        .iter()
        .flat_map(|p| p.removals.iter().copied())
        .collect();

    let mut candidates: Vec<&CoinRecord> = state
        .coins
        .values()
        .filter(|r| r.confirmed && !r.spent && r.coin.lock_hash == *lock_hash)
        .collect();
    // Largest first keeps input counts small
    candidates.sort_by(|a, b| b.coin.value.cmp(&a.coin.value));

    let mut selected = Vec::new();
    let mut selected_total: Amount = 0;
    for record in &candidates {
        if selected_total >= amount {
            break;
        }
        if reserved.contains(&record.coin.coin_id()) {
            continue;
        }
        selected_total += record.coin.value;
        selected.push(record.coin.clone());
    }

    if selected_total < amount {
        let confirmed: Amount = candidates.iter().map(|r| r.coin.value).sum();
        return Err(WalletError::InsufficientSpendableBalance {
            required: amount,
            spendable: selected_total,
            confirmed,
        });
    }

    Ok(selected)
}

//! Tests for the lineage ledger, following the life of a coin across
//! several wallets.

use std::collections::BTreeMap;

use ed25519_dalek::{Keypair, PublicKey, SecretKey};
use strand_core::bundle::{anyone_can_spend_lock_hash, issue_genesis};
use strand_core::commitment::lock_hash_for_lineage;
use strand_core::signing::{verify_bundle, SignaturePolicy};
use strand_core::{Amount, Coin, Hash, Lineage, LockTemplate, SpendBundle};
use strand_wallet::{LineageLedger, WalletError};

fn template() -> LockTemplate {
    LockTemplate::new(b"integration-lock-template".to_vec())
}

fn domain_tag() -> Hash {
    [0x51; 32]
}

fn keypair_from_seed(seed: u8) -> Keypair {
    let secret = SecretKey::from_bytes(&[seed; 32]).unwrap();
    let public = PublicKey::from(&secret);
    Keypair { secret, public }
}

/// Builds the expected balance map from (lineage, amount) pairs, the way a
/// reporting collaborator would present it.
fn balance_by_lineage(
    template: &LockTemplate,
    entries: &[(&Lineage, Amount)],
) -> BTreeMap<Hash, Amount> {
    entries
        .iter()
        .map(|(lineage, amount)| (lock_hash_for_lineage(template, lineage), *amount))
        .collect()
}

/// Mints `amount` into `ledger` under the wallet's genesis lineage and
/// settles the bundle, as if the external ledger confirmed it.
fn fund_genesis(ledger: &LineageLedger, lineage: &Lineage, amount: Amount, issuance: u8) -> Coin {
    ledger.register_lineage(lineage.clone());
    let parent = Coin::new([issuance; 32], anyone_can_spend_lock_hash(), amount);
    let bundle = issue_genesis(ledger.template(), &parent, lineage, amount).unwrap();
    ledger.record_pending_bundle(&bundle);
    assert!(ledger.settle_bundle(&bundle.bundle_id()));
    bundle.additions()[0].clone()
}

/// Applies a settled bundle to every wallet that saw it broadcast. The
/// generating ledger already tracks it as pending and only settles.
fn broadcast(bundle: &SpendBundle, generator: &LineageLedger, observers: &[&LineageLedger]) {
    assert!(generator.settle_bundle(&bundle.bundle_id()));
    for ledger in observers {
        ledger.record_pending_bundle(bundle);
        assert!(ledger.settle_bundle(&bundle.bundle_id()));
    }
}

/// Genesis issuance lands the full amount under the genesis lineage.
#[test]
fn test_genesis_issuance() {
    let keypair = keypair_from_seed(1);
    let ledger = LineageLedger::new(template());
    let lineage = Lineage::genesis(keypair.public.to_bytes());

    fund_genesis(&ledger, &lineage, 100, 0);

    assert_eq!(
        ledger.confirmed_balance(),
        balance_by_lineage(ledger.template(), &[(&lineage, 100)])
    );
    assert_eq!(ledger.unconfirmed_balance(), ledger.confirmed_balance());
}

/// A vertical spend moves value onto the extended chain; both wallets see
/// it once they register the new lineage.
#[test]
fn test_vertical_spend_between_wallets() {
    let keypair1 = keypair_from_seed(1);
    let keypair2 = keypair_from_seed(2);
    let pk1 = keypair1.public.to_bytes();
    let pk2 = keypair2.public.to_bytes();

    let ledger1 = LineageLedger::new(template());
    let ledger2 = LineageLedger::new(template());

    let genesis = Lineage::genesis(pk1);
    fund_genesis(&ledger1, &genesis, 100, 0);

    let handed = genesis.child(pk2);
    let source = ledger1.register_lineage(genesis.clone());
    ledger1.register_lineage(handed.clone());
    ledger2.register_lineage(handed.clone());

    let record = ledger1
        .generate_signed_spend(
            &[50],
            &[handed.clone()],
            &source,
            &keypair1,
            domain_tag(),
            SignaturePolicy::Required,
        )
        .unwrap();
    verify_bundle(&record.bundle, ledger1.template(), domain_tag()).unwrap();

    // Before settlement the unconfirmed balance already reflects the move
    assert_eq!(
        ledger1.unconfirmed_balance(),
        balance_by_lineage(ledger1.template(), &[(&genesis, 50), (&handed, 50)])
    );
    assert_eq!(
        ledger1.confirmed_balance(),
        balance_by_lineage(ledger1.template(), &[(&genesis, 100)])
    );

    broadcast(&record.bundle, &ledger1, &[&ledger2]);

    assert_eq!(
        ledger1.confirmed_balance(),
        balance_by_lineage(ledger1.template(), &[(&genesis, 50), (&handed, 50)])
    );
    assert_eq!(
        ledger2.confirmed_balance(),
        balance_by_lineage(ledger2.template(), &[(&handed, 50)])
    );
}

/// The full progression: genesis, two vertical handoffs, then a clawback
/// back to the genesis owner.
#[test]
fn test_spend_progression_across_three_wallets() {
    let keypair1 = keypair_from_seed(1);
    let keypair2 = keypair_from_seed(2);
    let keypair3 = keypair_from_seed(3);
    let pk1 = keypair1.public.to_bytes();
    let pk2 = keypair2.public.to_bytes();
    let pk3 = keypair3.public.to_bytes();

    let ledger1 = LineageLedger::new(template());
    let ledger2 = LineageLedger::new(template());
    let ledger3 = LineageLedger::new(template());
    let tpl = template();

    let chain1 = Lineage::genesis(pk1);
    let chain12 = chain1.child(pk2);
    let chain123 = chain12.child(pk3);

    // Genesis in wallet 1
    fund_genesis(&ledger1, &chain1, 100, 0);
    let source1 = lock_hash_for_lineage(&tpl, &chain1);

    // Vertical spend to wallet 2
    ledger1.register_lineage(chain12.clone());
    ledger2.register_lineage(chain12.clone());
    let record = ledger1
        .generate_signed_spend(
            &[50],
            &[chain12.clone()],
            &source1,
            &keypair1,
            domain_tag(),
            SignaturePolicy::Required,
        )
        .unwrap();
    broadcast(&record.bundle, &ledger1, &[&ledger2, &ledger3]);

    assert_eq!(
        ledger1.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&chain1, 50), (&chain12, 50)])
    );
    assert_eq!(
        ledger2.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&chain12, 50)])
    );

    // Vertical spend from wallet 2 to wallet 3
    let source12 = lock_hash_for_lineage(&tpl, &chain12);
    ledger1.register_lineage(chain123.clone());
    ledger2.register_lineage(chain123.clone());
    ledger3.register_lineage(chain123.clone());
    let record = ledger2
        .generate_signed_spend(
            &[20],
            &[chain123.clone()],
            &source12,
            &keypair2,
            domain_tag(),
            SignaturePolicy::Required,
        )
        .unwrap();
    broadcast(&record.bundle, &ledger2, &[&ledger1, &ledger3]);

    assert_eq!(
        ledger1.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&chain1, 50), (&chain12, 30), (&chain123, 20)])
    );
    assert_eq!(
        ledger2.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&chain12, 30), (&chain123, 20)])
    );
    assert_eq!(
        ledger3.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&chain123, 20)])
    );

    // Wallet 3 claws half of its coin back to the genesis owner
    let source123 = lock_hash_for_lineage(&tpl, &chain123);
    ledger3.register_lineage(chain1.clone());
    let record = ledger3
        .generate_signed_spend(
            &[10],
            &[chain1.clone()],
            &source123,
            &keypair3,
            domain_tag(),
            SignaturePolicy::Required,
        )
        .unwrap();
    verify_bundle(&record.bundle, &tpl, domain_tag()).unwrap();
    broadcast(&record.bundle, &ledger3, &[&ledger1, &ledger2]);

    assert_eq!(
        ledger1.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&chain1, 60), (&chain12, 30), (&chain123, 10)])
    );
    assert_eq!(
        ledger2.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&chain12, 30), (&chain123, 10)])
    );
    assert_eq!(
        ledger3.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&chain1, 10), (&chain123, 10)])
    );
}

/// Coins locked to a foreign lineage stay invisible until it is registered.
#[test]
fn test_lineage_isolation() {
    let ledger = LineageLedger::new(template());
    let tpl = template();

    let mine = Lineage::genesis([1; 32]);
    let theirs = Lineage::genesis([2; 32]).child([3; 32]);

    ledger.register_lineage(mine.clone());
    ledger.observe_coin(
        Coin::new([0; 32], lock_hash_for_lineage(&tpl, &mine), 40),
        true,
    );
    ledger.observe_coin(
        Coin::new([1; 32], lock_hash_for_lineage(&tpl, &theirs), 60),
        true,
    );

    assert_eq!(
        ledger.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&mine, 40)])
    );

    // Registering the other chain reveals its coins without touching ours
    ledger.register_lineage(theirs.clone());
    assert_eq!(
        ledger.confirmed_balance(),
        balance_by_lineage(&tpl, &[(&mine, 40), (&theirs, 60)])
    );
}

/// Coins reserved by an in-flight spend cannot fund a second one, even
/// though the confirmed total would cover it.
#[test]
fn test_pending_reservation_blocks_double_spend() {
    let keypair = keypair_from_seed(1);
    let ledger = LineageLedger::new(template());
    let lineage = Lineage::genesis(keypair.public.to_bytes());

    let source = ledger.register_lineage(lineage.clone());
    fund_genesis(&ledger, &lineage, 100, 0);

    let receiver = lineage.child([2; 32]);
    let first = ledger
        .generate_signed_spend(
            &[60],
            &[receiver.clone()],
            &source,
            &keypair,
            domain_tag(),
            SignaturePolicy::Required,
        )
        .unwrap();

    // The single 100-coin is reserved, so nothing is spendable
    let second = ledger.generate_signed_spend(
        &[10],
        &[receiver.clone()],
        &source,
        &keypair,
        domain_tag(),
        SignaturePolicy::Required,
    );
    match second {
        Err(WalletError::InsufficientSpendableBalance {
            required,
            spendable,
            confirmed,
        }) => {
            assert_eq!(required, 10);
            assert_eq!(spendable, 0);
            assert_eq!(confirmed, 100);
        }
        other => panic!("expected reservation failure, got {:?}", other),
    }

    // Once the first spend settles, its change funds the retry
    assert!(ledger.settle_bundle(&first.bundle.bundle_id()));
    ledger
        .generate_signed_spend(
            &[10],
            &[receiver],
            &source,
            &keypair,
            domain_tag(),
            SignaturePolicy::Required,
        )
        .unwrap();
}

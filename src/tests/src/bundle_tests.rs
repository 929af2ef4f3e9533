//! Tests for bundle construction against the core crate.

use strand_core::bundle::{
    anyone_can_spend_lock_hash, build_spend_descriptors, issue_genesis, Payment, SpendKind,
    SpendableCoin,
};
use strand_core::commitment::lock_hash_for_lineage;
use strand_core::signing::{sign_bundle, verify_bundle, SignaturePolicy};
use strand_core::{Coin, CoreError, Hash, Lineage, LockTemplate, SpendBundle};

use ed25519_dalek::{Keypair, PublicKey, SecretKey};

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

fn coin_locked_to(template: &LockTemplate, lineage: &Lineage, value: u64, parent: u8) -> Coin {
    Coin::new([parent; 32], lock_hash_for_lineage(template, lineage), value)
}

/// A genesis coin of value 30 split 10/20 between two handoffs produces
/// output coins locked to the extended chains.
#[test]
fn test_genesis_split_scenario() {
    let template = template();
    let owner1 = keypair_from_seed(1);
    let genesis = Lineage::genesis(owner1.public.to_bytes());
    let coin = coin_locked_to(&template, &genesis, 30, 0);

    let to_owner2 = genesis.child([2; 32]);
    let to_owner3 = genesis.child([3; 32]);
    let payments = vec![vec![
        Payment::new(to_owner2.clone(), 10),
        Payment::new(to_owner3.clone(), 20),
    ]];

    let descriptors = build_spend_descriptors(
        &[SpendableCoin::new(coin, genesis)],
        &payments,
        &template,
        owner1.public.to_bytes(),
        &[],
    )
    .unwrap();
    let bundle = sign_bundle(descriptors, &owner1, domain_tag(), SignaturePolicy::Required).unwrap();
    verify_bundle(&bundle, &template, domain_tag()).unwrap();

    let additions = bundle.additions();
    assert_eq!(additions.len(), 2);
    assert_eq!(
        additions[0].lock_hash,
        lock_hash_for_lineage(&template, &to_owner2)
    );
    assert_eq!(additions[0].value, 10);
    assert_eq!(
        additions[1].lock_hash,
        lock_hash_for_lineage(&template, &to_owner3)
    );
    assert_eq!(additions[1].value, 20);
}

/// A secondhand coin spent onward extends its chain by one owner.
#[test]
fn test_secondhand_spend_scenario() {
    let template = template();
    let owner2 = keypair_from_seed(2);
    let chain = Lineage::genesis([1; 32]).child(owner2.public.to_bytes());
    let coin = coin_locked_to(&template, &chain, 10, 0);

    let extended = chain.child([3; 32]);
    let payments = vec![vec![Payment::new(extended.clone(), 10)]];

    let descriptors = build_spend_descriptors(
        &[SpendableCoin::new(coin, chain)],
        &payments,
        &template,
        owner2.public.to_bytes(),
        &[],
    )
    .unwrap();
    assert_eq!(descriptors.len(), 1);

    let bundle = sign_bundle(descriptors, &owner2, domain_tag(), SignaturePolicy::Required).unwrap();
    verify_bundle(&bundle, &template, domain_tag()).unwrap();

    let additions = bundle.additions();
    assert_eq!(additions.len(), 1);
    assert_eq!(
        additions[0].lock_hash,
        lock_hash_for_lineage(&template, &extended)
    );
}

/// A spend can also hand value across at the same chain depth: the receiver
/// chain shares the parent prefix but ends in a different owner.
#[test]
fn test_same_depth_handoff() {
    let template = template();
    let owner2 = keypair_from_seed(2);
    let chain = Lineage::genesis([1; 32]).child(owner2.public.to_bytes());
    let coin = coin_locked_to(&template, &chain, 10, 0);

    let across = chain.truncated(1).unwrap().child([4; 32]);
    assert_eq!(across.depth(), chain.depth());
    let payments = vec![vec![Payment::new(across.clone(), 10)]];

    let descriptors = build_spend_descriptors(
        &[SpendableCoin::new(coin, chain)],
        &payments,
        &template,
        owner2.public.to_bytes(),
        &[],
    )
    .unwrap();
    // Same depth, so this is a plain transfer, not a clawback
    assert_eq!(descriptors[0].solution.kind, SpendKind::Transfer);

    let bundle = sign_bundle(descriptors, &owner2, domain_tag(), SignaturePolicy::Required).unwrap();
    verify_bundle(&bundle, &template, domain_tag()).unwrap();
    assert_eq!(
        bundle.additions()[0].lock_hash,
        lock_hash_for_lineage(&template, &across)
    );
}

/// Truncating back to the genesis owner is a permitted spend.
#[test]
fn test_clawback_scenario() {
    let template = template();
    let owner1 = keypair_from_seed(1);
    let chain = Lineage::genesis(owner1.public.to_bytes())
        .child([2; 32])
        .child([3; 32]);
    let coin = coin_locked_to(&template, &chain, 10, 0);

    let ancestor = chain.truncated(1).unwrap();
    let payments = vec![vec![Payment::new(ancestor.clone(), 10)]];

    let descriptors = build_spend_descriptors(
        &[SpendableCoin::new(coin, chain)],
        &payments,
        &template,
        owner1.public.to_bytes(),
        &[],
    )
    .unwrap();
    assert_eq!(descriptors[0].solution.kind, SpendKind::Clawback);

    let bundle = sign_bundle(descriptors, &owner1, domain_tag(), SignaturePolicy::Required).unwrap();
    verify_bundle(&bundle, &template, domain_tag()).unwrap();

    assert_eq!(
        bundle.additions()[0].lock_hash,
        lock_hash_for_lineage(&template, &ancestor)
    );
}

/// A three-coin ring verifies, and tampering with any subtotal breaks it.
#[test]
fn test_ring_verification_catches_subtotal_tampering() {
    let template = template();
    let owner = keypair_from_seed(1);
    let chain = Lineage::genesis(owner.public.to_bytes());

    let spendables: Vec<SpendableCoin> = (0..3u8)
        .map(|i| SpendableCoin::new(coin_locked_to(&template, &chain, 10 + i as u64, i), chain.clone()))
        .collect();
    let payments = vec![
        vec![Payment::new(chain.child([9; 32]), 33)],
        Vec::new(),
        Vec::new(),
    ];

    let descriptors = build_spend_descriptors(
        &spendables,
        &payments,
        &template,
        owner.public.to_bytes(),
        &[],
    )
    .unwrap();
    let bundle = sign_bundle(descriptors, &owner, domain_tag(), SignaturePolicy::Required).unwrap();
    verify_bundle(&bundle, &template, domain_tag()).unwrap();

    for i in 0..3 {
        let mut tampered = bundle.clone();
        tampered.spends[i].solution.subtotal += 1;
        assert!(
            verify_bundle(&tampered, &template, domain_tag()).is_err(),
            "tampered subtotal at spend {} went unnoticed",
            i
        );
    }
}

/// Reordering the spends of a signed bundle breaks the ring linkage.
#[test]
fn test_ring_verification_catches_reordering() {
    let template = template();
    let owner = keypair_from_seed(1);
    let chain = Lineage::genesis(owner.public.to_bytes());

    let spendables: Vec<SpendableCoin> = (0..3u8)
        .map(|i| SpendableCoin::new(coin_locked_to(&template, &chain, 10, i), chain.clone()))
        .collect();
    let payments = vec![
        vec![Payment::new(chain.child([9; 32]), 30)],
        Vec::new(),
        Vec::new(),
    ];

    let descriptors = build_spend_descriptors(
        &spendables,
        &payments,
        &template,
        owner.public.to_bytes(),
        &[],
    )
    .unwrap();
    let bundle = sign_bundle(descriptors, &owner, domain_tag(), SignaturePolicy::Required).unwrap();

    let mut reordered = bundle.clone();
    reordered.spends.swap(1, 2);
    // The subtotals of spends 1 and 2 are equal here, so the conservation
    // rule still holds; the neighbor commitments are what give it away.
    assert!(verify_bundle(&reordered, &template, domain_tag()).is_err());
}

/// Commitment derivation is deterministic and stable across calls.
#[test]
fn test_commitment_determinism() {
    let template = template();
    let chain = Lineage::genesis([1; 32]).child([2; 32]).child([3; 32]);

    let first = lock_hash_for_lineage(&template, &chain);
    for _ in 0..10 {
        assert_eq!(lock_hash_for_lineage(&template, &chain), first);
    }

    // Rebuilding the same logical chain from scratch reproduces the hash
    let rebuilt = Lineage::new(vec![[1; 32], [2; 32], [3; 32]]).unwrap();
    assert_eq!(lock_hash_for_lineage(&template, &rebuilt), first);
}

/// An unbalanced bundle is refused before any descriptor exists, and a
/// hand-built unbalanced bundle is refused by verification.
#[test]
fn test_conservation_is_enforced_twice() {
    let template = template();
    let owner = keypair_from_seed(1);
    let chain = Lineage::genesis(owner.public.to_bytes());
    let coin = coin_locked_to(&template, &chain, 30, 0);

    let payments = vec![vec![Payment::new(chain.child([2; 32]), 40)]];
    let result = build_spend_descriptors(
        &[SpendableCoin::new(coin.clone(), chain.clone())],
        &payments,
        &template,
        owner.public.to_bytes(),
        &[],
    );
    assert_eq!(result, Err(CoreError::ValueImbalance { net: -10 }));

    // Force an imbalance past construction by editing a signed bundle
    let balanced = vec![vec![Payment::new(chain.child([2; 32]), 30)]];
    let descriptors = build_spend_descriptors(
        &[SpendableCoin::new(coin, chain)],
        &balanced,
        &template,
        owner.public.to_bytes(),
        &[],
    )
    .unwrap();
    let bundle = sign_bundle(descriptors, &owner, domain_tag(), SignaturePolicy::Required).unwrap();
    let mut unbalanced = bundle;
    unbalanced.spends[0].coin.value += 5;
    assert!(verify_bundle(&unbalanced, &template, domain_tag()).is_err());
}

/// Bundles survive a serialization round trip intact.
#[test]
fn test_bundle_serialization_roundtrip() {
    let template = template();
    let lineage = Lineage::genesis(keypair_from_seed(1).public.to_bytes());
    let parent = Coin::new([0; 32], anyone_can_spend_lock_hash(), 100);
    let bundle = issue_genesis(&template, &parent, &lineage, 100).unwrap();

    let encoded = bincode::serialize(&bundle).unwrap();
    let decoded: SpendBundle = bincode::deserialize(&encoded).unwrap();
    assert_eq!(bundle, decoded);
    assert_eq!(bundle.bundle_id(), decoded.bundle_id());
    verify_bundle(&decoded, &template, domain_tag()).unwrap();
}

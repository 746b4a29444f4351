pub(crate) mod helpers;

mod confirm_tests;
mod epoch_upgrades;
mod process_legacy;
mod process_receive;
mod process_send;
mod rollback_tests;

pub(crate) use helpers::AccountBlockFactory;

use crate::{LedgerContext, DEV_GENESIS_ACCOUNT, DEV_GENESIS_HASH};
use vanta_core::Amount;

#[test]
fn empty_ledger_contains_genesis() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();

    assert_eq!(ctx.ledger.block_count(), 1);
    assert_eq!(ctx.ledger.account_count(), 1);
    assert_eq!(ctx.ledger.cemented_count(), 1);
    assert!(ctx.ledger.any().block_exists(&txn, &DEV_GENESIS_HASH));
    assert_eq!(
        ctx.ledger.any().account_balance(&txn, &DEV_GENESIS_ACCOUNT),
        Some(Amount::MAX)
    );
}

#[test]
fn genesis_holds_all_weight() {
    let ctx = LedgerContext::empty();
    assert_eq!(
        ctx.ledger.weight(&(*DEV_GENESIS_ACCOUNT).into()),
        Amount::MAX
    );
}

#[test]
fn genesis_is_cemented() {
    let ctx = LedgerContext::empty();
    let txn = ctx.ledger.read_txn();
    assert!(ctx.ledger.confirmed().block_exists(&txn, &DEV_GENESIS_HASH));
}

#[test]
fn bootstrap_weights_apply_below_cutover() {
    use std::collections::HashMap;
    use vanta_core::PublicKey;

    let rep = PublicKey::from(42);
    let mut weights = HashMap::new();
    weights.insert(rep, Amount::vanta(1000));

    let store = vanta_store::Store::new();
    let ledger = crate::Ledger::with_bootstrap_weights(
        store,
        crate::LEDGER_CONSTANTS_STUB.clone(),
        weights,
        100,
    )
    .unwrap();

    // Below the cutover the external table is authoritative
    assert_eq!(ledger.weight(&rep), Amount::vanta(1000));
    // Representatives outside the table fall through to the live table
    assert_eq!(ledger.weight(&PublicKey::from(43)), Amount::zero());
}

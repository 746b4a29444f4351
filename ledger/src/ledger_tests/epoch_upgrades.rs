use crate::{BlockStatus, LedgerContext, LEDGER_CONSTANTS_STUB};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use vanta_core::{Amount, Epoch, PrivateKey, PublicKey};

#[test]
fn epoch_1_upgrade() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let epoch = genesis.epoch(&txn, Epoch::Epoch1);
    let saved = ctx.ledger.process(&mut txn, &epoch).unwrap();

    assert!(saved.is_epoch());
    assert!(!saved.is_send());
    assert!(!saved.is_receive());
    assert_eq!(saved.epoch(), Epoch::Epoch1);

    let info = ctx
        .ledger
        .any()
        .get_account(&txn, &genesis.account())
        .unwrap();
    assert_eq!(info.epoch, Epoch::Epoch1);
    // Balance and representative unchanged
    assert_eq!(info.balance, Amount::MAX);
}

#[test]
fn epoch_levels_advance_sequentially() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    // Skipping epoch 1 is rejected
    let epoch2 = genesis.epoch(&txn, Epoch::Epoch2);
    assert_eq!(
        ctx.ledger.process(&mut txn, &epoch2).err(),
        Some(BlockStatus::BlockPosition)
    );

    let epoch1 = genesis.epoch(&txn, Epoch::Epoch1);
    ctx.ledger.process(&mut txn, &epoch1).unwrap();
    let epoch2 = genesis.epoch(&txn, Epoch::Epoch2);
    ctx.ledger.process(&mut txn, &epoch2).unwrap();

    // Upgrading twice to the same level is rejected
    let epoch2_again = genesis.epoch(&txn, Epoch::Epoch2);
    assert_eq!(
        ctx.ledger.process(&mut txn, &epoch2_again).err(),
        Some(BlockStatus::BlockPosition)
    );
}

#[test]
fn epoch_block_may_not_change_representative() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let info = ctx
        .ledger
        .any()
        .get_account(&txn, &genesis.account())
        .unwrap();
    let link = *ctx.ledger.constants.epochs.link(Epoch::Epoch1).unwrap();
    let epoch = vanta_core::Block::State(vanta_core::StateBlock::new(
        genesis.account(),
        info.head,
        PublicKey::from(99), // different representative
        info.balance,
        link,
        &crate::DEV_GENESIS_KEY,
        super::helpers::DEV_WORK_POOL.generate_dev(info.head),
    ));

    assert_eq!(
        ctx.ledger.process(&mut txn, &epoch).err(),
        Some(BlockStatus::RepresentativeMismatch)
    );
}

#[test]
fn epoch_open_without_pending_is_rejected() {
    let ctx = LedgerContext::empty();
    let unopened = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let epoch_open = unopened.epoch_open(Epoch::Epoch1);
    assert_eq!(
        ctx.ledger.process(&mut txn, &epoch_open).err(),
        Some(BlockStatus::GapEpochOpenPending)
    );
}

#[test]
fn epoch_open_with_pending_succeeds() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, receiver.account(), Amount::vanta(10));
    ctx.ledger.process(&mut txn, &send).unwrap();

    // An unopened account may open directly at any epoch
    let epoch_open = receiver.epoch_open(Epoch::Epoch1);
    let saved = ctx.ledger.process(&mut txn, &epoch_open).unwrap();

    assert!(saved.is_epoch());
    assert_eq!(saved.balance(), Amount::zero());
    assert_eq!(saved.epoch(), Epoch::Epoch1);

    // The receivable is still there, to be consumed by a state receive
    assert!(ctx
        .ledger
        .store
        .pending
        .any_for_account(&txn, &receiver.account()));
}

#[test]
fn epoch_2_callback_fires_exactly_once() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    ctx.ledger.on_epoch_2_started(Box::new(move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    }));

    let mut txn = ctx.ledger.rw_txn();

    let epoch1 = genesis.epoch(&txn, Epoch::Epoch1);
    ctx.ledger.process(&mut txn, &epoch1).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!ctx.ledger.epoch_2_started());

    let epoch2 = genesis.epoch(&txn, Epoch::Epoch2);
    ctx.ledger.process(&mut txn, &epoch2).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(ctx.ledger.epoch_2_started());

    // Further epoch 2 artifacts do not fire again
    let send = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(1));
    ctx.ledger.process(&mut txn, &send).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn epoch_2_flag_survives_ledger_reconstruction() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    {
        let mut txn = ctx.ledger.rw_txn();
        let epoch1 = genesis.epoch(&txn, Epoch::Epoch1);
        ctx.ledger.process(&mut txn, &epoch1).unwrap();
        let epoch2 = genesis.epoch(&txn, Epoch::Epoch2);
        ctx.ledger.process(&mut txn, &epoch2).unwrap();
    }
    assert!(ctx.ledger.epoch_2_started());

    // A fresh ledger over the same store derives the flag from stored state
    let reopened =
        crate::Ledger::new(ctx.ledger.store.clone(), LEDGER_CONSTANTS_STUB.clone()).unwrap();
    assert!(reopened.epoch_2_started());
}

#[test]
fn epoch_block_sending_funds_is_rejected() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let info = ctx
        .ledger
        .any()
        .get_account(&txn, &genesis.account())
        .unwrap();
    let link = *ctx.ledger.constants.epochs.link(Epoch::Epoch1).unwrap();
    // An epoch link combined with a balance drop is signed by the owner,
    // making it a send to the epoch account, which no one controls; it is
    // still applied as a send, not as an epoch upgrade
    let block = vanta_core::Block::State(vanta_core::StateBlock::new(
        genesis.account(),
        info.head,
        info.representative,
        info.balance - Amount::vanta(1),
        link,
        &genesis.key,
        super::helpers::DEV_WORK_POOL.generate_dev(info.head),
    ));

    let saved = ctx.ledger.process(&mut txn, &block).unwrap();
    assert!(saved.is_send());
    assert!(!saved.is_epoch());
}

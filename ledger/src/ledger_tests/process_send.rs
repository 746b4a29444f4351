use super::AccountBlockFactory;
use crate::{BlockStatus, LedgerContext, DEV_GENESIS_ACCOUNT, DEV_GENESIS_PUB_KEY};
use vanta_core::{Amount, PendingKey, PrivateKey};

#[test]
fn process_state_send() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let destination = PrivateKey::new();
    let send = genesis.send(&txn, destination.account(), Amount::vanta(50));
    let saved = ctx.ledger.process(&mut txn, &send).unwrap();

    assert!(saved.is_send());
    assert_eq!(saved.height(), 2);
    assert_eq!(saved.balance(), Amount::MAX - Amount::vanta(50));
    assert_eq!(ctx.ledger.block_count(), 2);

    // The send created a receivable claim for the destination
    let pending = ctx
        .ledger
        .store
        .pending
        .get(&txn, &PendingKey::new(destination.account(), send.hash()))
        .unwrap();
    assert_eq!(pending.source, *DEV_GENESIS_ACCOUNT);
    assert_eq!(pending.amount, Amount::vanta(50));
}

#[test]
fn sending_reduces_representative_weight() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(50));
    ctx.ledger.process(&mut txn, &send).unwrap();

    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_PUB_KEY),
        Amount::MAX - Amount::vanta(50)
    );
}

#[test]
fn process_duplicate_send_fails_with_old() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(1));
    ctx.ledger.process(&mut txn, &send).unwrap();

    let result = ctx.ledger.process(&mut txn, &send);
    assert_eq!(result.err(), Some(BlockStatus::Old));
    assert_eq!(ctx.ledger.block_count(), 2);
}

#[test]
fn process_fork_in_same_slot() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send1 = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(1));
    let send2 = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(2));
    ctx.ledger.process(&mut txn, &send1).unwrap();

    let result = ctx.ledger.process(&mut txn, &send2);
    assert_eq!(result.err(), Some(BlockStatus::Fork));
}

#[test]
fn process_send_with_unknown_previous() {
    use vanta_core::{Block, BlockHash, Link, StateBlock};

    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();
    let key = PrivateKey::new();

    let send = Block::State(StateBlock::new(
        key.account(),
        BlockHash::from(12345),
        key.public_key(),
        Amount::vanta(1),
        Link::from(1),
        &key,
        super::helpers::DEV_WORK_POOL.generate_dev(BlockHash::from(12345)),
    ));

    let result = ctx.ledger.process(&mut txn, &send);
    assert_eq!(result.err(), Some(BlockStatus::GapPrevious));
}

#[test]
fn process_send_with_wrong_signature() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let mut send = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(1));
    send.set_block_signature(vanta_core::Signature::zero());

    let result = ctx.ledger.process(&mut txn, &send);
    assert_eq!(result.err(), Some(BlockStatus::BadSignature));
}

#[test]
fn process_send_with_insufficient_work() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let mut send = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(1));
    // Look for a nonce below the send threshold
    let mut work = 0u64;
    loop {
        let difficulty = vanta_core::work::DifficultyV1::get_difficulty(&send.root(), work);
        if difficulty < ctx.ledger.constants.work.epoch_1 {
            break;
        }
        work += 1;
    }
    send.set_work(work);

    let result = ctx.ledger.process(&mut txn, &send);
    assert_eq!(result.err(), Some(BlockStatus::InsufficientWork));
}

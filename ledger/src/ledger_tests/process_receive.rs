use crate::{BlockStatus, LedgerContext, DEV_GENESIS_PUB_KEY};
use vanta_core::{Amount, PendingKey, PrivateKey};

#[test]
fn open_account_with_state_block() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, receiver.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send).unwrap();

    let open = receiver.open(send.hash(), Amount::vanta(100));
    let saved = ctx.ledger.process(&mut txn, &open).unwrap();

    assert!(saved.is_receive());
    assert_eq!(saved.height(), 1);
    assert_eq!(ctx.ledger.account_count(), 2);
    assert_eq!(
        ctx.ledger.any().account_balance(&txn, &receiver.account()),
        Some(Amount::vanta(100))
    );

    // The pending entry was consumed
    assert_eq!(
        ctx.ledger
            .store
            .pending
            .get(&txn, &PendingKey::new(receiver.account(), send.hash())),
        None
    );
}

#[test]
fn receive_into_existing_account() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send1 = genesis.send(&txn, receiver.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send1).unwrap();
    let send2 = genesis.send(&txn, receiver.account(), Amount::vanta(25));
    ctx.ledger.process(&mut txn, &send2).unwrap();

    let open = receiver.open(send1.hash(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &open).unwrap();
    let receive = receiver.receive(&txn, send2.hash(), Amount::vanta(25));
    let saved = ctx.ledger.process(&mut txn, &receive).unwrap();

    assert!(saved.is_receive());
    assert_eq!(saved.balance(), Amount::vanta(125));
    assert_eq!(
        ctx.ledger.weight(&receiver.key.public_key()),
        Amount::vanta(125)
    );
}

#[test]
fn receive_without_pending_entry_is_unreceivable() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    // A send to a different account
    let other = PrivateKey::new();
    let send = genesis.send(&txn, other.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send).unwrap();

    let open = receiver.open(send.hash(), Amount::vanta(100));
    let result = ctx.ledger.process(&mut txn, &open);
    assert_eq!(result.err(), Some(BlockStatus::Unreceivable));
}

#[test]
fn receive_from_unknown_source_is_gap_source() {
    let ctx = LedgerContext::empty();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let open = receiver.open(vanta_core::BlockHash::from(999), Amount::vanta(1));
    let result = ctx.ledger.process(&mut txn, &open);
    assert_eq!(result.err(), Some(BlockStatus::GapSource));
}

#[test]
fn receive_with_wrong_amount_is_balance_mismatch() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, receiver.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send).unwrap();

    // Claim more than was sent
    let open = receiver.open(send.hash(), Amount::vanta(101));
    let result = ctx.ledger.process(&mut txn, &open);
    assert_eq!(result.err(), Some(BlockStatus::BalanceMismatch));
}

#[test]
fn double_open_is_fork() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send1 = genesis.send(&txn, receiver.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send1).unwrap();
    let send2 = genesis.send(&txn, receiver.account(), Amount::vanta(50));
    ctx.ledger.process(&mut txn, &send2).unwrap();

    let open1 = receiver.open(send1.hash(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &open1).unwrap();

    let open2 = receiver.open(send2.hash(), Amount::vanta(50));
    let result = ctx.ledger.process(&mut txn, &open2);
    assert_eq!(result.err(), Some(BlockStatus::Fork));
}

#[test]
fn receiving_moves_weight_to_receiver_representative() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, receiver.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send).unwrap();
    let open = receiver.open(send.hash(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &open).unwrap();

    assert_eq!(
        ctx.ledger.weight(&DEV_GENESIS_PUB_KEY),
        Amount::MAX - Amount::vanta(100)
    );
    assert_eq!(
        ctx.ledger.weight(&receiver.key.public_key()),
        Amount::vanta(100)
    );
}

use crate::{LedgerContext, DEV_GENESIS_PUB_KEY};
use vanta_core::{Amount, PendingKey, PrivateKey};

#[test]
fn rollback_send_restores_ledger_state() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let destination = PrivateKey::new();
    let send = genesis.send(&txn, destination.account(), Amount::vanta(50));
    ctx.ledger.process(&mut txn, &send).unwrap();

    let rolled_back = ctx.ledger.rollback(&mut txn, &send.hash()).unwrap();

    assert_eq!(rolled_back.len(), 1);
    assert_eq!(rolled_back[0].hash(), send.hash());
    assert!(!ctx.ledger.any().block_exists(&txn, &send.hash()));
    assert_eq!(ctx.ledger.block_count(), 1);
    assert_eq!(ctx.ledger.weight(&DEV_GENESIS_PUB_KEY), Amount::MAX);
    assert_eq!(
        ctx.ledger
            .store
            .pending
            .get(&txn, &PendingKey::new(destination.account(), send.hash())),
        None
    );

    let info = ctx
        .ledger
        .any()
        .get_account(&txn, &genesis.account())
        .unwrap();
    assert_eq!(info.block_count, 1);
    assert_eq!(info.balance, Amount::MAX);
}

#[test]
fn rollback_receive_recreates_pending() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, receiver.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send).unwrap();
    let open = receiver.open(send.hash(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &open).unwrap();

    ctx.ledger.rollback(&mut txn, &open.hash()).unwrap();

    // The claim is receivable again and the account is gone
    let pending = ctx
        .ledger
        .store
        .pending
        .get(&txn, &PendingKey::new(receiver.account(), send.hash()))
        .unwrap();
    assert_eq!(pending.amount, Amount::vanta(100));
    assert_eq!(pending.source, genesis.account());
    assert_eq!(
        ctx.ledger.any().get_account(&txn, &receiver.account()),
        None
    );
    assert_eq!(ctx.ledger.weight(&receiver.key.public_key()), Amount::zero());
    assert_eq!(ctx.ledger.account_count(), 1);
}

#[test]
fn rollback_of_received_send_rolls_back_receiver_first() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, receiver.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send).unwrap();
    let open = receiver.open(send.hash(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &open).unwrap();

    // Rolling back the send has to undo the dependent open as well
    let rolled_back = ctx.ledger.rollback(&mut txn, &send.hash()).unwrap();

    let hashes: Vec<_> = rolled_back.iter().map(|b| b.hash()).collect();
    assert!(hashes.contains(&send.hash()));
    assert!(hashes.contains(&open.hash()));
    assert!(!ctx.ledger.any().block_exists(&txn, &send.hash()));
    assert!(!ctx.ledger.any().block_exists(&txn, &open.hash()));
    assert_eq!(ctx.ledger.weight(&DEV_GENESIS_PUB_KEY), Amount::MAX);
}

#[test]
fn rollback_rejects_cemented_blocks() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(1));
    ctx.ledger.process(&mut txn, &send).unwrap();
    ctx.ledger.confirm(&mut txn, send.hash());

    assert!(ctx.ledger.rollback(&mut txn, &send.hash()).is_err());
    assert!(ctx.ledger.any().block_exists(&txn, &send.hash()));
}

#[test]
fn rollback_chain_suffix() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send1 = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(1));
    ctx.ledger.process(&mut txn, &send1).unwrap();
    let send2 = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(2));
    ctx.ledger.process(&mut txn, &send2).unwrap();

    // Rolling back the earlier block takes the later one with it
    let rolled_back = ctx.ledger.rollback(&mut txn, &send1.hash()).unwrap();

    assert_eq!(rolled_back.len(), 2);
    assert!(!ctx.ledger.any().block_exists(&txn, &send1.hash()));
    assert!(!ctx.ledger.any().block_exists(&txn, &send2.hash()));
    let info = ctx
        .ledger
        .any()
        .get_account(&txn, &genesis.account())
        .unwrap();
    assert_eq!(info.head, crate::DEV_GENESIS_HASH.clone());
}

#[test]
fn rollback_change_restores_previous_representative() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let representative = vanta_core::PublicKey::from(7);
    let change = genesis.change(&txn, representative);
    ctx.ledger.process(&mut txn, &change).unwrap();
    assert_eq!(ctx.ledger.weight(&representative), Amount::MAX);

    ctx.ledger.rollback(&mut txn, &change.hash()).unwrap();

    assert_eq!(ctx.ledger.weight(&representative), Amount::zero());
    assert_eq!(ctx.ledger.weight(&DEV_GENESIS_PUB_KEY), Amount::MAX);
}

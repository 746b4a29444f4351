use crate::{BlockStatus, LedgerContext, DEV_GENESIS_ACCOUNT};
use vanta_core::{Amount, PrivateKey, PublicKey};

#[test]
fn process_legacy_send_and_open() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.legacy_send(&txn, receiver.account(), Amount::vanta(100));
    let saved = ctx.ledger.process(&mut txn, &send).unwrap();
    assert!(saved.is_send());

    // Legacy heads are tracked in the frontier index
    assert_eq!(
        ctx.ledger.store.frontier.get(&txn, &send.hash()),
        Some(*DEV_GENESIS_ACCOUNT)
    );

    let open = receiver.legacy_open(send.hash());
    let saved_open = ctx.ledger.process(&mut txn, &open).unwrap();
    assert!(saved_open.is_receive());
    assert_eq!(saved_open.balance(), Amount::vanta(100));
}

#[test]
fn process_legacy_receive() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send1 = genesis.legacy_send(&txn, receiver.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send1).unwrap();
    let send2 = genesis.legacy_send(&txn, receiver.account(), Amount::vanta(30));
    ctx.ledger.process(&mut txn, &send2).unwrap();

    let open = receiver.legacy_open(send1.hash());
    ctx.ledger.process(&mut txn, &open).unwrap();
    let receive = receiver.legacy_receive(&txn, send2.hash());
    let saved = ctx.ledger.process(&mut txn, &receive).unwrap();

    assert_eq!(saved.balance(), Amount::vanta(130));
    assert_eq!(saved.height(), 2);
}

#[test]
fn process_legacy_change() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let representative = PublicKey::from(7);
    let change = genesis.legacy_change(&txn, representative);
    let saved = ctx.ledger.process(&mut txn, &change).unwrap();

    assert!(!saved.is_send());
    assert!(!saved.is_receive());
    assert_eq!(ctx.ledger.weight(&representative), Amount::MAX);
}

#[test]
fn legacy_send_with_higher_balance_is_negative_spend() {
    let ctx = LedgerContext::empty();
    let mut txn = ctx.ledger.rw_txn();

    let head = ctx
        .ledger
        .any()
        .account_head(&txn, &DEV_GENESIS_ACCOUNT)
        .unwrap();
    let send = vanta_core::Block::LegacySend(vanta_core::SendBlock::new(
        head,
        PrivateKey::new().account(),
        Amount::MAX,
        &crate::DEV_GENESIS_KEY,
        super::helpers::DEV_WORK_POOL.generate_dev(head),
    ));

    let result = ctx.ledger.process(&mut txn, &send);
    assert_eq!(result.err(), Some(BlockStatus::NegativeSpend));
}

#[test]
fn legacy_block_after_state_block_is_block_position() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    // Upgrade the chain to state blocks first
    let state_send = genesis.send(&txn, PrivateKey::new().account(), Amount::vanta(1));
    ctx.ledger.process(&mut txn, &state_send).unwrap();

    let legacy_send = genesis.legacy_send(&txn, PrivateKey::new().account(), Amount::vanta(1));
    let result = ctx.ledger.process(&mut txn, &legacy_send);
    assert_eq!(result.err(), Some(BlockStatus::BlockPosition));
}

#[test]
fn legacy_receive_of_upgraded_send_is_unreceivable() {
    use vanta_core::Epoch;

    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    // Bring the genesis account to epoch 1 so its sends carry epoch 1 pending entries
    let epoch1 = genesis.epoch(&txn, Epoch::Epoch1);
    ctx.ledger.process(&mut txn, &epoch1).unwrap();

    let send = genesis.send(&txn, receiver.account(), Amount::vanta(10));
    ctx.ledger.process(&mut txn, &send).unwrap();

    let open = receiver.legacy_open(send.hash());
    let result = ctx.ledger.process(&mut txn, &open);
    assert_eq!(result.err(), Some(BlockStatus::Unreceivable));
}

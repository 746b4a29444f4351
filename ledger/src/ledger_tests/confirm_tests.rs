use crate::LedgerContext;
use vanta_core::Amount;

#[test]
fn confirm_cements_chain_prefix() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send1 = genesis.send(&txn, vanta_core::PrivateKey::new().account(), Amount::vanta(1));
    ctx.ledger.process(&mut txn, &send1).unwrap();
    let send2 = genesis.send(&txn, vanta_core::PrivateKey::new().account(), Amount::vanta(1));
    ctx.ledger.process(&mut txn, &send2).unwrap();

    let cemented = ctx.ledger.confirm(&mut txn, send2.hash());

    // Both sends cement, lowest height first
    assert_eq!(
        cemented.iter().map(|b| b.hash()).collect::<Vec<_>>(),
        vec![send1.hash(), send2.hash()]
    );
    assert_eq!(ctx.ledger.cemented_count(), 3);
    assert!(ctx.ledger.confirmed().block_exists(&txn, &send2.hash()));
}

#[test]
fn confirm_cements_sender_before_receiver() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, receiver.account(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &send).unwrap();
    let open = receiver.open(send.hash(), Amount::vanta(100));
    ctx.ledger.process(&mut txn, &open).unwrap();

    let cemented = ctx.ledger.confirm(&mut txn, open.hash());

    let hashes: Vec<_> = cemented.iter().map(|b| b.hash()).collect();
    let send_position = hashes.iter().position(|h| *h == send.hash()).unwrap();
    let open_position = hashes.iter().position(|h| *h == open.hash()).unwrap();
    assert!(send_position < open_position);
    assert!(ctx.ledger.confirmed().block_exists(&txn, &send.hash()));
    assert!(ctx.ledger.confirmed().block_exists(&txn, &open.hash()));
}

#[test]
fn confirm_already_cemented_is_a_no_op() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, vanta_core::PrivateKey::new().account(), Amount::vanta(1));
    ctx.ledger.process(&mut txn, &send).unwrap();

    assert_eq!(ctx.ledger.confirm(&mut txn, send.hash()).len(), 1);
    assert_eq!(ctx.ledger.confirm(&mut txn, send.hash()).len(), 0);
    assert_eq!(ctx.ledger.cemented_count(), 2);
}

#[test]
fn dependents_confirmed() {
    let ctx = LedgerContext::empty();
    let genesis = ctx.genesis_block_factory();
    let receiver = ctx.block_factory();
    let mut txn = ctx.ledger.rw_txn();

    let send = genesis.send(&txn, receiver.account(), Amount::vanta(100));
    let send_saved = ctx.ledger.process(&mut txn, &send).unwrap();
    let open = receiver.open(send.hash(), Amount::vanta(100));
    let open_saved = ctx.ledger.process(&mut txn, &open).unwrap();

    // The send sits on the cemented genesis, the open waits for the send
    assert!(ctx.ledger.dependents_confirmed(&txn, &send_saved));
    assert!(!ctx.ledger.dependents_confirmed(&txn, &open_saved));

    ctx.ledger.confirm(&mut txn, send.hash());
    assert!(ctx.ledger.dependents_confirmed(&txn, &open_saved));
}

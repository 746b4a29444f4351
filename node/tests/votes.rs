use std::{sync::Arc, time::Duration};
use vanta_core::{Amount, PrivateKey, Vote, VoteCode, VoteSource};
use vanta_ledger::DEV_GENESIS_KEY;
use vanta_node::{
    test_helpers::{assert_never, assert_timely, assert_timely_eq, genesis_send, make_node, open_block},
    transport::ChannelId,
};

/// Votes from one representative must strictly increase in
/// (sequence, hash); duplicates and older sequences are replays.
#[test]
fn repeated_vote_is_replay() {
    let node = make_node();

    // A representative with a little weight
    let rep = PrivateKey::new();
    let send_rep = {
        let txn = node.ledger.read_txn();
        genesis_send(&node.ledger, &txn, rep.account(), Amount::vanta(1000))
    };
    node.process_active(send_rep.clone());
    let open_rep = open_block(&rep, &send_rep, Amount::vanta(1000));
    node.process_active(open_rep.clone());
    assert_timely(Duration::from_secs(5), || {
        let txn = node.ledger.read_txn();
        node.ledger.any().block_exists(&txn, &open_rep.hash())
    });

    // The target election
    let target = {
        let txn = node.ledger.read_txn();
        genesis_send(&node.ledger, &txn, PrivateKey::new().account(), Amount::vanta(1))
    };
    node.process_active(target.clone());
    assert_timely(Duration::from_secs(5), || {
        node.active.active_block(&target.hash())
    });

    let channel = ChannelId::from(42);
    let vote2 = Arc::new(Vote::new(&rep, 2, vec![target.hash()]));
    assert_eq!(
        node.vote_processor
            .vote_blocking(&vote2, channel, VoteSource::Live),
        VoteCode::Vote
    );
    // The identical vote within the cooldown window replays
    assert_eq!(
        node.vote_processor
            .vote_blocking(&vote2, channel, VoteSource::Live),
        VoteCode::Replay
    );
    // An older sequence replays as well
    let vote1 = Arc::new(Vote::new(&rep, 1, vec![target.hash()]));
    assert_eq!(
        node.vote_processor
            .vote_blocking(&vote1, channel, VoteSource::Live),
        VoteCode::Replay
    );
    // A newer sequence inside the cooldown is ignored, not replayed
    let vote3 = Arc::new(Vote::new(&rep, 3, vec![target.hash()]));
    assert_eq!(
        node.vote_processor
            .vote_blocking(&vote3, channel, VoteSource::Live),
        VoteCode::Indeterminate
    );
    // A final vote bypasses the cooldown
    let final_vote = Arc::new(Vote::new_final(&rep, vec![target.hash()]));
    assert_eq!(
        node.vote_processor
            .vote_blocking(&final_vote, channel, VoteSource::Live),
        VoteCode::Vote
    );
}

/// Without enough participating weight an election never confirms
#[test]
fn small_representative_cannot_confirm() {
    let node = make_node();

    let rep = PrivateKey::new();
    let send_rep = {
        let txn = node.ledger.read_txn();
        genesis_send(&node.ledger, &txn, rep.account(), Amount::vanta(1000))
    };
    node.process_active(send_rep.clone());
    let open_rep = open_block(&rep, &send_rep, Amount::vanta(1000));
    node.process_active(open_rep.clone());
    assert_timely(Duration::from_secs(5), || {
        let txn = node.ledger.read_txn();
        node.ledger.any().block_exists(&txn, &open_rep.hash())
    });

    let target = {
        let txn = node.ledger.read_txn();
        genesis_send(&node.ledger, &txn, PrivateKey::new().account(), Amount::vanta(1))
    };
    node.process_active(target.clone());
    assert_timely(Duration::from_secs(5), || {
        node.active.active_block(&target.hash())
    });

    node.vote(
        Arc::new(Vote::new_final(&rep, vec![target.hash()])),
        ChannelId::from(42),
    );

    assert_never(Duration::from_millis(500), || {
        node.block_confirmed(&target.hash())
    });
}

/// Votes naming recently confirmed slots classify as replays
#[test]
fn vote_for_recently_confirmed_is_replay() {
    let node = make_node();

    let send = {
        let txn = node.ledger.read_txn();
        genesis_send(&node.ledger, &txn, PrivateKey::new().account(), Amount::vanta(1))
    };
    node.process_active(send.clone());
    assert_timely(Duration::from_secs(5), || {
        node.active.active_block(&send.hash())
    });

    node.vote(
        Arc::new(Vote::new_final(&DEV_GENESIS_KEY, vec![send.hash()])),
        ChannelId::from(42),
    );
    assert_timely(Duration::from_secs(5), || node.block_confirmed(&send.hash()));

    // Wait for the terminated election to leave the container
    assert_timely_eq(Duration::from_secs(5), || node.active.len(), 0);
    assert!(node.active.was_recently_confirmed(&send.hash()));

    let late = Arc::new(Vote::new(&DEV_GENESIS_KEY, 1, vec![send.hash()]));
    assert_eq!(
        node.vote_processor
            .vote_blocking(&late, ChannelId::from(42), VoteSource::Live),
        VoteCode::Replay
    );
}

/// A representative observed voting joins the online set
#[test]
fn voting_representative_is_observed_online() {
    let node = make_node();

    let send = {
        let txn = node.ledger.read_txn();
        genesis_send(&node.ledger, &txn, PrivateKey::new().account(), Amount::vanta(1))
    };
    node.process_active(send.clone());
    assert_timely(Duration::from_secs(5), || {
        node.active.active_block(&send.hash())
    });

    assert_eq!(node.online_reps.lock().unwrap().count(), 0);
    node.vote(
        Arc::new(Vote::new_final(&DEV_GENESIS_KEY, vec![send.hash()])),
        ChannelId::from(42),
    );
    assert_timely_eq(
        Duration::from_secs(5),
        || node.online_reps.lock().unwrap().count(),
        1,
    );
}

use std::{sync::Arc, time::Duration};
use vanta_core::{Amount, Block, BlockHash, PrivateKey, StateBlock, Vote};
use vanta_ledger::{Writer, DEV_GENESIS_HASH, DEV_GENESIS_KEY};
use vanta_node::{
    consensus::{ActiveTransactionsExt, ElectionBehavior},
    stats::{DetailType, Direction, StatType},
    test_helpers::{
        assert_timely, assert_timely_eq, genesis_send, make_node, make_node_with_config,
        open_block, start_election, DEV_WORK_POOL,
    },
    transport::ChannelId,
    NodeConfig,
};

/// A fresh send gets an election which confirms once a quorum carrying
/// representative votes for it, and the block is cemented.
#[test]
fn confirm_active_send() {
    let node = make_node();
    let send = {
        let txn = node.ledger.read_txn();
        genesis_send(
            &node.ledger,
            &txn,
            PrivateKey::new().account(),
            Amount::vanta(100),
        )
    };
    node.process_active(send.clone());

    let election = start_election(&node, &send.hash());

    // The election solicits confirmation while unconfirmed
    assert_timely(Duration::from_secs(5), || {
        election
            .confirmation_request_count
            .load(std::sync::atomic::Ordering::SeqCst)
            > 0
    });

    // A genesis vote reaches quorum
    let vote = Arc::new(Vote::new_final(&DEV_GENESIS_KEY, vec![send.hash()]));
    node.vote(vote, ChannelId::from(111));

    assert_timely(Duration::from_secs(5), || node.block_confirmed(&send.hash()));
    assert_timely_eq(Duration::from_secs(5), || node.ledger.cemented_count(), 2);
    assert_eq!(election.mutex.lock().unwrap().last_blocks.len(), 1);
}

/// A vote that arrives before its block is buffered; when the named block
/// later loses the race into the ledger, the cached quorum flips the
/// election to it and only that fork is cemented.
#[test]
fn inactive_votes_cache_fork() {
    let node = make_node();
    let key = PrivateKey::new();

    let genesis_info = {
        let txn = node.ledger.read_txn();
        node.ledger
            .any()
            .get_account(&txn, &vanta_ledger::DEV_GENESIS_ACCOUNT)
            .unwrap()
    };
    let send1 = Block::State(StateBlock::new(
        *vanta_ledger::DEV_GENESIS_ACCOUNT,
        *DEV_GENESIS_HASH,
        genesis_info.representative,
        Amount::MAX - Amount::vanta(100),
        key.account().into(),
        &DEV_GENESIS_KEY,
        DEV_WORK_POOL.generate_dev(*DEV_GENESIS_HASH),
    ));
    let send2 = Block::State(StateBlock::new(
        *vanta_ledger::DEV_GENESIS_ACCOUNT,
        *DEV_GENESIS_HASH,
        genesis_info.representative,
        Amount::MAX - Amount::vanta(200),
        key.account().into(),
        &DEV_GENESIS_KEY,
        DEV_WORK_POOL.generate_dev(*DEV_GENESIS_HASH),
    ));

    // The vote for send1 arrives before either block
    let vote = Arc::new(Vote::new_final(&DEV_GENESIS_KEY, vec![send1.hash()]));
    node.vote(vote, ChannelId::from(111));
    assert_timely_eq(
        Duration::from_secs(5),
        || node.active.vote_cache.lock().unwrap().len(),
        1,
    );

    // The losing fork reaches the ledger first
    node.process_active(send2.clone());
    assert_timely(Duration::from_secs(5), || {
        let txn = node.ledger.read_txn();
        node.ledger.any().block_exists(&txn, &send2.hash())
    });

    node.process_active(send1.clone());

    // Exactly send1 confirms and is cemented
    assert_timely(Duration::from_secs(10), || {
        node.block_confirmed(&send1.hash())
    });
    assert_timely(Duration::from_secs(5), || {
        let txn = node.ledger.read_txn();
        !node.ledger.any().block_exists(&txn, &send2.hash())
    });
    assert_eq!(
        node.stats
            .count(StatType::Election, DetailType::VoteCached, Direction::In),
        1
    );
}

/// Five distinct cached voters start elections for the hashes they voted
/// on; a following large-weight vote confirms them all. A hash whose block
/// never arrives keeps its cache entry with all flags set.
#[test]
fn election_start_from_cached_voters() {
    let node = make_node();
    let keys: Vec<PrivateKey> = (0..5).map(|_| PrivateKey::new()).collect();

    // Five sends from genesis, confirmed up front
    let mut sends = Vec::new();
    for key in &keys {
        let send = {
            let txn = node.ledger.read_txn();
            genesis_send(&node.ledger, &txn, key.account(), Amount::vanta(2000))
        };
        node.process_active(send.clone());
        assert_timely(Duration::from_secs(5), || {
            let txn = node.ledger.read_txn();
            node.ledger.any().block_exists(&txn, &send.hash())
        });
        sends.push(send);
    }
    let send_hashes: Vec<BlockHash> = sends.iter().map(|send| send.hash()).collect();
    node.vote(
        Arc::new(Vote::new_final(&DEV_GENESIS_KEY, send_hashes)),
        ChannelId::from(111),
    );
    assert_timely_eq(Duration::from_secs(5), || node.ledger.cemented_count(), 6);
    assert_timely_eq(Duration::from_secs(5), || node.active.len(), 0);

    // The open blocks themselves stay unprocessed while votes arrive
    let opens: Vec<Block> = keys
        .iter()
        .zip(&sends)
        .map(|(key, send)| open_block(key, send, Amount::vanta(2000)))
        .collect();
    let unknown_hash = BlockHash::random();
    let mut voted_hashes: Vec<BlockHash> = opens.iter().map(|open| open.hash()).collect();
    voted_hashes.push(unknown_hash);

    for key in &keys {
        node.vote(
            Arc::new(Vote::new(key, 1, voted_hashes.clone())),
            ChannelId::from(112),
        );
    }

    // At the fifth voter every entry flips to election started; the blocks
    // are still missing so activation is deferred
    assert_timely(Duration::from_secs(5), || {
        node.active
            .vote_cache
            .lock()
            .unwrap()
            .find(&unknown_hash)
            .map(|entry| entry.status.election_started)
            .unwrap_or(false)
    });
    assert_eq!(node.active.len(), 0);

    // The blocks arrive, five elections start
    for open in &opens {
        node.process_active(open.clone());
    }
    assert_timely_eq(Duration::from_secs(5), || node.active.len(), 5);

    // A large weight vote over all six hashes confirms all five
    node.vote(
        Arc::new(Vote::new_final(&DEV_GENESIS_KEY, voted_hashes)),
        ChannelId::from(113),
    );
    assert_timely_eq(Duration::from_secs(10), || node.ledger.cemented_count(), 11);

    // The never-arrived hash keeps its observable flags
    let entry = node
        .active
        .vote_cache
        .lock()
        .unwrap()
        .find(&unknown_hash)
        .unwrap();
    assert!(entry.status.bootstrap_started);
    assert!(entry.status.election_started);
    assert!(entry.status.confirmed);
}

/// A block whose root was recently dropped restarts its election when a
/// strictly higher work version arrives; the stored block is overwritten.
#[test]
fn restart_dropped_on_higher_work() {
    let node = make_node();
    let send = {
        let txn = node.ledger.read_txn();
        genesis_send(
            &node.ledger,
            &txn,
            PrivateKey::new().account(),
            Amount::vanta(1),
        )
    };
    node.process_active(send.clone());
    assert_timely(Duration::from_secs(5), || {
        node.active.active_root(&send.qualified_root())
    });

    // Drop the election, remembering the root
    assert!(node.active.erase(&send.qualified_root()));
    assert!(node
        .active
        .recently_dropped
        .find(&send.qualified_root())
        .is_some());

    // Same block content with strictly more work
    let thresholds = &node.network_params.ledger.work;
    let old_difficulty = thresholds.difficulty_block(&send);
    let mut better_work = DEV_WORK_POOL.generate_dev(send.root());
    while thresholds.difficulty(vanta_core::work::WorkVersion::Work1, &send.root(), better_work)
        <= old_difficulty
    {
        better_work = better_work.wrapping_add(1);
    }
    let mut higher = send.clone();
    higher.set_work(better_work);

    node.process_active(higher.clone());

    assert_timely_eq(
        Duration::from_secs(5),
        || {
            node.stats
                .count(StatType::Active, DetailType::ElectionRestart, Direction::In)
        },
        1,
    );
    assert_timely_eq(
        Duration::from_secs(5),
        || {
            let txn = node.ledger.read_txn();
            node.ledger.any().get_block(&txn, &send.hash()).unwrap().work()
        },
        better_work,
    );
    assert!(node.active.active_root(&send.qualified_root()));

    // Re-sending the original, weaker version does nothing
    node.process_active(send.clone());
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(
        node.stats
            .count(StatType::Active, DetailType::ElectionRestart, Direction::In),
        1
    );
    let txn = node.ledger.read_txn();
    assert_eq!(
        node.ledger.any().get_block(&txn, &send.hash()).unwrap().work(),
        better_work
    );
}

/// Expired optimistic elections are retried pessimistically, one account at
/// a time, lowest account first.
#[test]
fn pessimistic_confirmation_of_expired_optimistic() {
    let node = make_node();
    let mut keys = [PrivateKey::new(), PrivateKey::new()];
    // Deterministic account order
    keys.sort_by_key(|key| key.account());

    // Two accounts with cemented sends and unconfirmed opens, applied
    // directly so no elections start
    let mut opens = Vec::new();
    {
        let _guard = node.ledger.write_queue.wait(Writer::Testing);
        let mut txn = node.ledger.rw_txn();
        for key in &keys {
            let send = genesis_send(&node.ledger, &txn, key.account(), Amount::vanta(10));
            node.ledger.process(&mut txn, &send).unwrap();
            node.ledger.confirm(&mut txn, send.hash());
            let open = open_block(key, &send, Amount::vanta(10));
            node.ledger.process(&mut txn, &open).unwrap();
            opens.push(open);
        }
    }

    // Optimistic elections expire without votes
    for open in &opens {
        node.active
            .insert(&Arc::new(open.clone()), ElectionBehavior::Optimistic, false);
    }
    assert_timely_eq(Duration::from_secs(5), || node.active.len(), 0);

    // The first call starts exactly one pessimistic election, for the
    // lowest account
    let election = node
        .active
        .confirm_expired_frontiers_pessimistically()
        .expect("no pessimistic election started");
    assert_eq!(election.qualified_root, opens[0].qualified_root());
    assert_eq!(node.active.len(), 1);

    // While it is in flight nothing further starts
    assert!(node
        .active
        .confirm_expired_frontiers_pessimistically()
        .is_none());

    // Confirm and cement the first open
    node.vote(
        Arc::new(Vote::new_final(&DEV_GENESIS_KEY, vec![opens[0].hash()])),
        ChannelId::from(111),
    );
    assert_timely(Duration::from_secs(5), || {
        node.block_confirmed(&opens[0].hash())
    });

    // The next call moves on to the next account
    assert_timely(Duration::from_secs(5), || {
        node.active
            .confirm_expired_frontiers_pessimistically()
            .map(|election| election.qualified_root == opens[1].qualified_root())
            .unwrap_or(false)
    });
}

/// Overflowing the election container drops the oldest unconfirmed
/// election, but never one started by a local wallet send.
#[test]
fn election_cap_drops_oldest_but_never_local_sends() {
    let mut config = NodeConfig::dev();
    config.active_elections.size = 4;
    // Keep the local representative from confirming everything on its own
    config.enable_voting = false;
    let node = make_node_with_config(config);

    node.wallets.insert(DEV_GENESIS_KEY.clone());

    // A local wallet send occupies the first slot
    let local_send = node
        .send_action(
            &DEV_GENESIS_KEY,
            PrivateKey::new().account(),
            Amount::vanta(1),
        )
        .unwrap();
    assert_timely(Duration::from_secs(5), || {
        node.active.active_root(&local_send.qualified_root())
    });

    // Overflow with live sends
    let mut sends = Vec::new();
    for _ in 0..4 {
        let send = {
            let txn = node.ledger.read_txn();
            genesis_send(
                &node.ledger,
                &txn,
                PrivateKey::new().account(),
                Amount::vanta(1),
            )
        };
        node.process_active(send.clone());
        assert_timely(Duration::from_secs(5), || {
            let txn = node.ledger.read_txn();
            node.ledger.any().block_exists(&txn, &send.hash())
        });
        sends.push(send);
    }

    assert_timely(Duration::from_secs(5), || {
        node.stats
            .count(StatType::Active, DetailType::ElectionDropOverflow, Direction::In)
            >= 1
    });
    // The local send election survives the overflow
    assert!(node.active.active_root(&local_send.qualified_root()));
    assert!(node.active.len() <= 4);
}

//! Helpers for driving a wired consensus core in tests.

use crate::{
    consensus::{ActiveTransactionsExt, Election, ElectionBehavior},
    config::{NetworkParams, Networks, NodeConfig},
    Node,
};
use once_cell::sync::Lazy;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;
use vanta_core::{
    work::{WorkPoolImpl, WorkThresholds},
    Account, Amount, Block, BlockHash, StateBlock,
};
use vanta_ledger::Ledger;
use vanta_store::{Store, Transaction};

pub static DEV_WORK_POOL: Lazy<WorkPoolImpl> =
    Lazy::new(|| WorkPoolImpl::new(WorkThresholds::publish_dev()));

pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A started dev-network node over a fresh store
pub fn make_node() -> Arc<Node> {
    make_node_with_config(NodeConfig::dev())
}

pub fn make_node_with_config(config: NodeConfig) -> Arc<Node> {
    init_tracing();
    let node = Node::new(Store::new(), config, NetworkParams::new(Networks::Dev));
    node.start();
    node
}

/// Builds a state send from the genesis account's current head
pub fn genesis_send(
    ledger: &Ledger,
    txn: &dyn Transaction,
    destination: Account,
    amount: Amount,
) -> Block {
    let info = ledger
        .any()
        .get_account(txn, &vanta_ledger::DEV_GENESIS_ACCOUNT)
        .unwrap();
    Block::State(StateBlock::new(
        *vanta_ledger::DEV_GENESIS_ACCOUNT,
        info.head,
        info.representative,
        info.balance - amount,
        destination.into(),
        &vanta_ledger::DEV_GENESIS_KEY,
        DEV_WORK_POOL.generate_dev(info.head),
    ))
}

/// Opens `account` receiving `source`, with the account as its own
/// representative
pub fn open_block(key: &vanta_core::PrivateKey, source: &Block, amount: Amount) -> Block {
    Block::State(StateBlock::new(
        key.account(),
        BlockHash::zero(),
        key.public_key(),
        amount,
        source.hash().into(),
        key,
        DEV_WORK_POOL.generate_dev(key.account()),
    ))
}

/// Waits for `condition` to become true, panicking after `timeout`
pub fn assert_timely(timeout: Duration, condition: impl Fn() -> bool) {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("timeout while waiting for condition");
}

pub fn assert_timely_eq<T>(timeout: Duration, actual: impl Fn() -> T, expected: T)
where
    T: PartialEq + std::fmt::Debug,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if actual() == expected {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let value = actual();
    assert_eq!(value, expected, "timeout while waiting for value");
}

/// Asserts that `condition` stays false for the whole duration
pub fn assert_never(duration: Duration, condition: impl Fn() -> bool) {
    let start = Instant::now();
    while start.elapsed() < duration {
        if condition() {
            panic!("condition became true unexpectedly");
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// Processes a block and starts an election for it
pub fn start_election(node: &Arc<Node>, hash: &BlockHash) -> Arc<Election> {
    assert_timely(Duration::from_secs(5), || {
        let txn = node.ledger.read_txn();
        node.ledger.any().block_exists(&txn, hash)
    });

    let block = {
        let txn = node.ledger.read_txn();
        node.ledger.any().get_block(&txn, hash).unwrap()
    };
    let (_, election) = node.active.insert(
        &Arc::new(block.block.clone()),
        ElectionBehavior::Normal,
        false,
    );
    election.expect("election could not start")
}

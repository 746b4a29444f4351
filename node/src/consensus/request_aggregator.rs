use super::{ActiveTransactions, LocalVoteHistory, VoteGenerator};
use crate::{
    config::NetworkConstants,
    stats::{DetailType, Direction, StatType, Stats},
    transport::{Channel, ChannelId, Message},
};
use std::{
    collections::HashMap,
    sync::{Arc, Condvar, Mutex},
    thread::JoinHandle,
    time::{Duration, Instant},
};
use tracing::trace;
use vanta_core::{BlockHash, Root, SavedBlock, Vote};
use vanta_ledger::Ledger;

#[derive(Clone, Debug)]
pub struct RequestAggregatorConfig {
    /// Maximum number of queued hashes per peer pool
    pub max_channel_requests: usize,
}

impl Default for RequestAggregatorConfig {
    fn default() -> Self {
        Self {
            max_channel_requests: 128,
        }
    }
}

/// Holds a buffer of incoming requests from an endpoint. Only the newest
/// channel for the endpoint is kept.
struct ChannelPool {
    channel: Arc<Channel>,
    hashes_roots: Vec<(BlockHash, Root)>,
    start: Instant,
    deadline: Instant,
}

struct AggregatorState {
    pools: HashMap<ChannelId, ChannelPool>,
    stopped: bool,
}

/// Pools together confirmation requests, separately for each endpoint.
/// Requests are aggregated to minimize bandwidth and vote generation:
/// cached votes answer as many hashes as possible, votes are generated
/// only for the remainder.
pub struct RequestAggregator {
    pub max_delay: Duration,
    pub small_delay: Duration,
    config: RequestAggregatorConfig,
    stats: Arc<Stats>,
    ledger: Arc<Ledger>,
    local_votes: Arc<LocalVoteHistory>,
    generator: Arc<VoteGenerator>,
    active: Arc<ActiveTransactions>,
    state: Mutex<AggregatorState>,
    condition: Condvar,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl RequestAggregator {
    pub fn new(
        network_constants: &NetworkConstants,
        config: RequestAggregatorConfig,
        stats: Arc<Stats>,
        ledger: Arc<Ledger>,
        local_votes: Arc<LocalVoteHistory>,
        generator: Arc<VoteGenerator>,
        active: Arc<ActiveTransactions>,
    ) -> Self {
        Self {
            max_delay: network_constants.aggregator_max_delay(),
            small_delay: network_constants.aggregator_small_delay(),
            config,
            stats,
            ledger,
            local_votes,
            generator,
            active,
            state: Mutex::new(AggregatorState {
                pools: HashMap::new(),
                stopped: false,
            }),
            condition: Condvar::new(),
            thread: Mutex::new(None),
        }
    }

    /// Add a new request by `channel` for the given hash/root pairs
    pub fn add(&self, channel: Arc<Channel>, hashes_roots: &[(BlockHash, Root)]) {
        let mut added = false;
        {
            let mut guard = self.state.lock().unwrap();
            let pool = guard
                .pools
                .entry(channel.channel_id)
                .or_insert_with(|| ChannelPool {
                    channel: Arc::clone(&channel),
                    hashes_roots: Vec::new(),
                    start: Instant::now(),
                    deadline: Instant::now() + self.small_delay,
                });
            // This extends the lifetime of the newest channel, which is
            // acceptable up to max_delay
            pool.channel = channel;
            if pool.hashes_roots.len() + hashes_roots.len() <= self.config.max_channel_requests {
                added = true;
                pool.deadline = std::cmp::min(
                    pool.start + self.max_delay,
                    Instant::now() + self.small_delay,
                );
                pool.hashes_roots.extend_from_slice(hashes_roots);
            }
        }

        self.stats.inc(
            StatType::Aggregator,
            if added {
                DetailType::AggregatorAccepted
            } else {
                DetailType::AggregatorDropped
            },
        );
        if added {
            self.condition.notify_all();
        }
    }

    /// Returns the number of currently queued request pools
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn run(&self) {
        let mut guard = self.state.lock().unwrap();
        while !guard.stopped {
            // Pop the pool with the earliest expired deadline
            let now = Instant::now();
            let due = guard
                .pools
                .iter()
                .filter(|(_, pool)| pool.deadline <= now)
                .min_by_key(|(_, pool)| pool.deadline)
                .map(|(id, _)| *id);

            match due {
                Some(id) => {
                    let pool = guard.pools.remove(&id).unwrap();
                    drop(guard);

                    let mut hashes_roots = pool.hashes_roots;
                    Self::erase_duplicates(&mut hashes_roots);
                    let remaining = self.aggregate(&hashes_roots, &pool.channel);
                    if !remaining.is_empty() {
                        // Generate votes for the remaining hashes
                        self.generate(&remaining, &pool.channel);
                    }

                    guard = self.state.lock().unwrap();
                }
                None => {
                    let next_deadline = guard
                        .pools
                        .values()
                        .map(|pool| pool.deadline)
                        .min()
                        .map(|deadline| deadline.saturating_duration_since(now))
                        .unwrap_or(self.small_delay);
                    guard = self
                        .condition
                        .wait_timeout(guard, next_deadline)
                        .unwrap()
                        .0;
                }
            }
        }
    }

    fn erase_duplicates(requests: &mut Vec<(BlockHash, Root)>) {
        requests.sort_by(|a, b| a.0.cmp(&b.0));
        requests.dedup_by_key(|pair| pair.0);
    }

    /// Answers requests from cached votes and looks up the blocks to vote
    /// on for the rest. Returns the hashes needing vote generation.
    fn aggregate(
        &self,
        requests: &[(BlockHash, Root)],
        channel: &Arc<Channel>,
    ) -> Vec<(Root, BlockHash)> {
        let txn = self.ledger.read_txn();
        let mut to_generate: Vec<(Root, BlockHash)> = Vec::new();
        let mut cached_votes: Vec<Arc<Vote>> = Vec::new();
        let mut cached_hashes = 0u64;

        for (hash, root) in requests {
            // 1. Votes in cache
            let found_votes = self.local_votes.votes(hash);
            if !found_votes.is_empty() {
                cached_hashes += 1;
                cached_votes.extend(found_votes);
                continue;
            }

            // 2. Election winner by hash
            let mut block: Option<SavedBlock> = self
                .active
                .winner(hash)
                .and_then(|winner| self.ledger.any().get_block(&txn, &winner.hash()));

            // 3. Ledger by hash
            if block.is_none() {
                block = self.ledger.any().get_block(&txn, hash);
            }

            // 4. Ledger by root
            if block.is_none() && !root.is_zero() {
                // Search for the successor of the slot
                let mut successor = self
                    .ledger
                    .any()
                    .block_successor(&txn, &(*root).into());
                if successor.is_none() {
                    // Search for the account's open block
                    successor = self
                        .ledger
                        .any()
                        .get_account(&txn, &(*root).into())
                        .map(|info| info.open_block);
                }
                if let Some(successor) = successor {
                    let successor_block = self.ledger.any().get_block(&txn, &successor);
                    if let Some(successor_block) = successor_block {
                        // 5. Votes in cache for the successor
                        let successor_votes = self.local_votes.votes(&successor);
                        if !successor_votes.is_empty() {
                            cached_hashes += 1;
                            cached_votes.extend(successor_votes);
                        } else {
                            block = Some(successor_block);
                        }
                    }
                }
            }

            match block {
                Some(block) => {
                    // Only vote on blocks with confirmed dependencies
                    if self.ledger.dependents_confirmed(&txn, &block) {
                        to_generate.push((block.root(), block.hash()));
                    } else {
                        self.stats.inc_dir(
                            StatType::Requests,
                            DetailType::RequestsCannotVote,
                            Direction::In,
                        );
                    }
                    // Let the peer know about the alternative block
                    if block.hash() != *hash {
                        channel.send(Message::Publish(block.block.clone()));
                    }
                }
                None => {
                    self.stats.inc_dir(
                        StatType::Requests,
                        DetailType::RequestsUnknown,
                        Direction::In,
                    );
                }
            }
        }

        // Unique votes only
        cached_votes.sort_by(|a, b| a.signature.cmp(&b.signature));
        cached_votes.dedup_by(|a, b| a.signature == b.signature);

        let cached_votes_count = cached_votes.len() as u64;
        for vote in cached_votes {
            channel.send(Message::ConfirmAck((*vote).clone()));
        }

        self.stats.add_dir(
            StatType::Requests,
            DetailType::RequestsCachedHashes,
            Direction::In,
            cached_hashes,
        );
        self.stats.add_dir(
            StatType::Requests,
            DetailType::RequestsCachedVotes,
            Direction::In,
            cached_votes_count,
        );
        trace!(
            channel = %channel.channel_id,
            cached = cached_votes_count,
            generate = to_generate.len(),
            "aggregated requests"
        );

        to_generate
    }

    /// Generates votes for the given hashes in batches, per local wallet
    /// representative
    fn generate(&self, hashes: &[(Root, BlockHash)], channel: &Arc<Channel>) {
        let mut generated = 0u64;
        for chunk in hashes.chunks(Vote::MAX_HASHES) {
            generated += self.generator.generate(chunk, channel) as u64;
        }
        self.stats.add_dir(
            StatType::Requests,
            DetailType::RequestsGeneratedHashes,
            Direction::In,
            hashes.len() as u64,
        );
        self.stats.add_dir(
            StatType::Requests,
            DetailType::RequestsGeneratedVotes,
            Direction::In,
            generated,
        );
    }

    pub fn stop(&self) {
        self.state.lock().unwrap().stopped = true;
        self.condition.notify_all();
        if let Some(handle) = self.thread.lock().unwrap().take() {
            handle.join().unwrap();
        }
    }
}

pub trait RequestAggregatorExt {
    fn start(&self);
}

impl RequestAggregatorExt for Arc<RequestAggregator> {
    fn start(&self) {
        let mut guard = self.thread.lock().unwrap();
        debug_assert!(guard.is_none());
        let self_clone = Arc::clone(self);
        *guard = Some(
            std::thread::Builder::new()
                .name("Req aggregator".to_string())
                .spawn(move || self_clone.run())
                .unwrap(),
        );
    }
}

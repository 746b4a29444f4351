use super::{
    confirmation_solicitor::ConfirmationSolicitor, Election, ElectionBehavior, ElectionData,
    ElectionState, ElectionStatus, ElectionStatusType, LocalVoteHistory, RecentlyConfirmedCache,
    RecentlyDroppedCache, VoteCache, VoteGenerator, NEXT_ELECTION_ID,
};
use crate::{
    block_processing::BlockProcessor,
    cementation::{CementedNotification, ConfirmingSet},
    config::{NetworkParams, NodeConfig},
    representatives::OnlineReps,
    stats::{DetailType, Sample, StatType, Stats},
    transport::Network,
    utils::ThreadPool,
    wallets::Wallets,
};
use bounded_vec_deque::BoundedVecDeque;
use std::{
    cmp::max,
    collections::{BTreeMap, HashMap},
    ops::Deref,
    sync::{atomic::Ordering, Arc, Condvar, Mutex, MutexGuard},
    thread::JoinHandle,
    time::{Duration, Instant},
};
use tracing::{debug, trace};
use vanta_core::{
    Account, Amount, Block, BlockHash, PublicKey, QualifiedRoot, Vote, VoteCode, VoteSource,
};
use vanta_ledger::Ledger;

const ELECTION_MAX_BLOCKS: usize = 10;

pub type ElectionEndCallback = Box<dyn Fn(&ElectionStatus) + Send + Sync>;
pub type BootstrapCallback = Box<dyn Fn(BlockHash) + Send + Sync>;

#[derive(Clone, Debug)]
pub struct ActiveElectionsConfig {
    /// Maximum number of simultaneous live elections
    pub size: usize,
    /// Share of `size` reserved for prioritized elections, in percent
    pub prioritized_percentage: usize,
    /// Maximum confirmation history size
    pub confirmation_history_size: usize,
    /// Maximum cache size for recently confirmed slots
    pub confirmation_cache: usize,
    /// Window of recent election multipliers the trend is computed over
    pub multiplier_window: usize,
    /// Retention of dropped roots eligible for a restart
    pub recently_dropped_retention: Duration,
}

impl Default for ActiveElectionsConfig {
    fn default() -> Self {
        Self {
            size: 5000,
            prioritized_percentage: 10,
            confirmation_history_size: 2048,
            confirmation_cache: 65536,
            multiplier_window: 256,
            recently_dropped_retention: RecentlyDroppedCache::DEFAULT_RETENTION,
        }
    }
}

#[derive(Default)]
pub struct OrderedRoots {
    by_root: HashMap<QualifiedRoot, Arc<Election>>,
    sequenced: Vec<QualifiedRoot>,
}

impl OrderedRoots {
    pub fn insert(&mut self, root: QualifiedRoot, election: Arc<Election>) {
        if self.by_root.insert(root.clone(), election).is_none() {
            self.sequenced.push(root);
        }
    }

    pub fn get(&self, root: &QualifiedRoot) -> Option<&Arc<Election>> {
        self.by_root.get(root)
    }

    pub fn erase(&mut self, root: &QualifiedRoot) {
        if self.by_root.remove(root).is_some() {
            self.sequenced.retain(|existing| existing != root)
        }
    }

    pub fn len(&self) -> usize {
        self.sequenced.len()
    }

    /// Elections in insertion order, oldest first
    pub fn iter_sequenced(&self) -> impl Iterator<Item = (&QualifiedRoot, &Arc<Election>)> {
        self.sequenced
            .iter()
            .map(|root| (root, self.by_root.get(root).unwrap()))
    }

    pub fn clear(&mut self) {
        self.by_root.clear();
        self.sequenced.clear();
    }
}

pub struct ActiveTransactionsData {
    pub roots: OrderedRoots,
    pub blocks: HashMap<BlockHash, Arc<Election>>,
    pub prioritized_count: usize,
    pub stopped: bool,
}

#[derive(PartialEq, Eq)]
pub struct TallyKey(pub Amount);

impl TallyKey {
    pub fn amount(&self) -> Amount {
        self.0
    }
}

impl Deref for TallyKey {
    type Target = Amount;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Ord for TallyKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Highest tally sorts first
        other.0.cmp(&self.0)
    }
}

impl PartialOrd for TallyKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

struct TrendedMultiplier {
    window: BoundedVecDeque<f64>,
    average: f64,
}

#[derive(Default)]
struct ExpiredOptimisticInfos {
    /// Accounts whose optimistic election expired unconfirmed; true once a
    /// pessimistic election was started and is still in flight
    by_account: BTreeMap<Account, bool>,
}

/// Owns the set of live elections: starts them, routes votes into them,
/// drives them to confirmation or expiry on the request loop thread and
/// bounds their number.
pub struct ActiveTransactions {
    pub mutex: Mutex<ActiveTransactionsData>,
    pub condition: Condvar,
    network_params: NetworkParams,
    config: ActiveElectionsConfig,
    node_config: NodeConfig,
    ledger: Arc<Ledger>,
    confirming_set: Arc<ConfirmingSet>,
    wallets: Arc<Wallets>,
    network: Arc<Network>,
    stats: Arc<Stats>,
    workers: Arc<dyn ThreadPool>,
    pub online_reps: Arc<Mutex<OnlineReps>>,
    pub vote_cache: Arc<Mutex<VoteCache>>,
    history: Arc<LocalVoteHistory>,
    generator: Arc<VoteGenerator>,
    block_processor: Arc<BlockProcessor>,
    pub recently_confirmed: Arc<RecentlyConfirmedCache>,
    pub recently_dropped: Arc<RecentlyDroppedCache>,
    pub recently_cemented: Mutex<BoundedVecDeque<ElectionStatus>>,
    pub election_winner_details: Mutex<HashMap<BlockHash, Arc<Election>>>,
    trended_multiplier: Mutex<TrendedMultiplier>,
    expired_optimistic: Mutex<ExpiredOptimisticInfos>,
    bootstrap_callback: Mutex<Option<BootstrapCallback>>,
    active_started_observers: Mutex<Vec<Box<dyn Fn(BlockHash) + Send + Sync>>>,
    active_stopped_observers: Mutex<Vec<Box<dyn Fn(BlockHash) + Send + Sync>>>,
    difficulty_changed_observers: Mutex<Vec<Box<dyn Fn(f64) + Send + Sync>>>,
    election_end_observers: Mutex<Vec<ElectionEndCallback>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl ActiveTransactions {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        network_params: NetworkParams,
        node_config: NodeConfig,
        ledger: Arc<Ledger>,
        confirming_set: Arc<ConfirmingSet>,
        wallets: Arc<Wallets>,
        network: Arc<Network>,
        stats: Arc<Stats>,
        workers: Arc<dyn ThreadPool>,
        online_reps: Arc<Mutex<OnlineReps>>,
        vote_cache: Arc<Mutex<VoteCache>>,
        history: Arc<LocalVoteHistory>,
        generator: Arc<VoteGenerator>,
        block_processor: Arc<BlockProcessor>,
    ) -> Self {
        let config = node_config.active_elections.clone();
        Self {
            mutex: Mutex::new(ActiveTransactionsData {
                roots: OrderedRoots::default(),
                blocks: HashMap::new(),
                prioritized_count: 0,
                stopped: false,
            }),
            condition: Condvar::new(),
            recently_confirmed: Arc::new(RecentlyConfirmedCache::new(config.confirmation_cache)),
            recently_dropped: Arc::new(RecentlyDroppedCache::new(
                config.confirmation_cache,
                config.recently_dropped_retention,
            )),
            recently_cemented: Mutex::new(BoundedVecDeque::new(config.confirmation_history_size)),
            trended_multiplier: Mutex::new(TrendedMultiplier {
                window: BoundedVecDeque::new(config.multiplier_window),
                average: 1f64,
            }),
            config,
            network_params,
            node_config,
            ledger,
            confirming_set,
            wallets,
            network,
            stats,
            workers,
            online_reps,
            vote_cache,
            history,
            generator,
            block_processor,
            election_winner_details: Mutex::new(HashMap::new()),
            expired_optimistic: Mutex::new(Default::default()),
            bootstrap_callback: Mutex::new(None),
            active_started_observers: Mutex::new(Vec::new()),
            active_stopped_observers: Mutex::new(Vec::new()),
            difficulty_changed_observers: Mutex::new(Vec::new()),
            election_end_observers: Mutex::new(Vec::new()),
            thread: Mutex::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.mutex.lock().unwrap().roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_bootstrap_callback(&self, callback: BootstrapCallback) {
        *self.bootstrap_callback.lock().unwrap() = Some(callback);
    }

    pub fn on_active_started(&self, callback: Box<dyn Fn(BlockHash) + Send + Sync>) {
        self.active_started_observers.lock().unwrap().push(callback);
    }

    pub fn on_active_stopped(&self, callback: Box<dyn Fn(BlockHash) + Send + Sync>) {
        self.active_stopped_observers.lock().unwrap().push(callback);
    }

    /// Fires when the trended election multiplier changes
    pub fn on_difficulty_changed(&self, callback: Box<dyn Fn(f64) + Send + Sync>) {
        self.difficulty_changed_observers.lock().unwrap().push(callback);
    }

    pub fn add_election_end_callback(&self, callback: ElectionEndCallback) {
        self.election_end_observers.lock().unwrap().push(callback);
    }

    pub fn active_root(&self, root: &QualifiedRoot) -> bool {
        self.mutex.lock().unwrap().roots.get(root).is_some()
    }

    pub fn active_block(&self, hash: &BlockHash) -> bool {
        self.mutex.lock().unwrap().blocks.contains_key(hash)
    }

    pub fn election(&self, root: &QualifiedRoot) -> Option<Arc<Election>> {
        self.mutex.lock().unwrap().roots.get(root).cloned()
    }

    pub fn election_for_hash(&self, hash: &BlockHash) -> Option<Arc<Election>> {
        self.mutex.lock().unwrap().blocks.get(hash).cloned()
    }

    /// Current winner of the election owning `hash`, if any
    pub fn winner(&self, hash: &BlockHash) -> Option<Arc<Block>> {
        let election = self.election_for_hash(hash)?;
        let guard = election.mutex.lock().unwrap();
        guard.status.winner.clone()
    }

    pub fn was_recently_confirmed(&self, hash: &BlockHash) -> bool {
        self.recently_confirmed.hash_exists(hash)
    }

    pub fn election_winner_details_len(&self) -> usize {
        self.election_winner_details.lock().unwrap().len()
    }

    pub fn remove_election_winner_details(&self, hash: &BlockHash) -> Option<Arc<Election>> {
        self.election_winner_details.lock().unwrap().remove(hash)
    }

    fn base_latency(&self) -> Duration {
        self.network_params.network.base_latency()
    }

    /// Time an election may run before being expired
    fn time_to_live(&self, election: &Election) -> Duration {
        match election.behavior {
            ElectionBehavior::Normal => self.network_params.network.election_expiration(),
            ElectionBehavior::Optimistic => {
                self.network_params.network.optimistic_election_expiration()
            }
        }
    }

    /// Calculates time delay between broadcasting confirmation requests
    fn confirm_req_time(&self, election: &Election) -> Duration {
        match election.behavior {
            ElectionBehavior::Normal => self.base_latency() * 5,
            ElectionBehavior::Optimistic => self.base_latency() * 10,
        }
    }

    /// Minimum time between broadcasts of the current election winner
    fn block_broadcast_interval(&self) -> Duration {
        self.base_latency() * 15
    }

    fn vote_broadcast_interval(&self) -> Duration {
        self.base_latency() * 15
    }

    /// Minimum time delay between subsequent votes from one representative
    pub fn cooldown_time(&self, weight: Amount) -> Duration {
        let online_stake = { self.online_reps.lock().unwrap().online_stake() };
        if weight > online_stake / 20 {
            // Reps with more than 5% weight
            Duration::from_secs(1)
        } else if weight > online_stake / 100 {
            // Reps with more than 1% weight
            Duration::from_secs(5)
        } else {
            // The rest of the smaller reps
            Duration::from_secs(15)
        }
    }

    fn priority_limit(&self) -> usize {
        self.config.size * self.config.prioritized_percentage / 100
    }

    pub fn trended_active_multiplier(&self) -> f64 {
        self.trended_multiplier.lock().unwrap().average
    }

    fn record_multiplier(&self, multiplier: f64) {
        let average = {
            let mut guard = self.trended_multiplier.lock().unwrap();
            guard.window.push_back(multiplier);
            let len = guard.window.len();
            if len > 0 {
                guard.average = guard.window.iter().sum::<f64>() / len as f64;
            }
            guard.average
        };
        let observers = self.difficulty_changed_observers.lock().unwrap();
        for observer in observers.iter() {
            observer(average);
        }
    }

    /// Normalized work multiplier of a block, used for election priority
    pub fn block_multiplier(&self, block: &Block) -> f64 {
        let txn = self.ledger.read_txn();
        let details = self
            .ledger
            .any()
            .get_block(&txn, &block.hash())
            .map(|saved| saved.sideband.details)
            .unwrap_or_default();
        self.network_params
            .ledger
            .work
            .multiplier_block(block, &details)
    }

    /// Summed representative weight per fork, highest first
    pub fn tally_impl(
        &self,
        guard: &mut MutexGuard<ElectionData>,
    ) -> BTreeMap<TallyKey, Arc<Block>> {
        let mut block_weights: HashMap<BlockHash, Amount> = HashMap::new();
        for (account, info) in &guard.last_votes {
            let rep_weight = self.ledger.weight(account);
            *block_weights.entry(info.hash).or_default() += rep_weight;
        }
        guard.last_tally = block_weights.clone();
        let mut result = BTreeMap::new();
        for (hash, weight) in block_weights {
            if let Some(block) = guard.last_blocks.get(&hash) {
                result.insert(TallyKey(weight), Arc::clone(block));
            }
        }
        result
    }

    /// An election confirms iff the participating weight reaches the
    /// configured minimum and the winner leads by more than delta
    pub fn have_quorum(&self, tally: &BTreeMap<TallyKey, Arc<Block>>) -> bool {
        let mut sum = Amount::zero();
        for key in tally.keys() {
            sum += key.amount();
        }
        if sum < self.node_config.online_weight_minimum {
            return false;
        }

        let mut iter = tally.keys();
        let first = iter.next().map(|key| key.amount()).unwrap_or_default();
        let second = iter.next().map(|key| key.amount()).unwrap_or_default();
        let delta = self.online_reps.lock().unwrap().delta();
        first - second > delta
    }

    /// Removes votes this node generated for `hash`, so a replacement
    /// winner is not blocked by our own earlier vote
    fn remove_votes(
        &self,
        election: &Election,
        guard: &mut MutexGuard<ElectionData>,
        hash: &BlockHash,
    ) {
        if self.node_config.enable_voting && self.wallets.voting_reps_count() > 0 {
            let generated = self.history.votes(hash);
            for vote in generated {
                guard.last_votes.remove(&vote.voting_account);
            }
            self.history.erase(&election.root);
        }
    }

    fn clear_publish_filter(&self, block: &Block) {
        self.network.publish_filter.clear(block);
    }

    /// Copies cached inactive votes for `hash` into an election
    fn insert_cached_votes(&self, election: &Arc<Election>, hash: &BlockHash) {
        let hash = *hash;
        let Some(entry) = self.vote_cache.lock().unwrap().find(&hash) else {
            return;
        };

        let mut inserted = 0;
        {
            let mut guard = election.mutex.lock().unwrap();
            for (representative, timestamp) in &entry.voters {
                if !guard.last_votes.contains_key(representative) {
                    guard.last_votes.insert(
                        *representative,
                        super::VoteInfo::new_aged(*timestamp, hash),
                    );
                    inserted += 1;
                }
            }
        }
        for _ in 0..inserted {
            self.stats.inc(StatType::Election, DetailType::VoteCached);
        }

        if inserted > 0 {
            let delay = entry.arrival.elapsed();
            if delay > self.vote_cache.lock().unwrap().config().late_blocks_delay {
                self.stats.inc(StatType::Election, DetailType::LateBlock);
                self.stats.add(
                    StatType::Election,
                    DetailType::LateBlockSeconds,
                    delay.as_secs(),
                );
            }
        }
    }

    fn completion_stat(&self, election: &Election) -> StatType {
        let guard = election.mutex.lock().unwrap();
        if guard.is_confirmed() {
            StatType::ActiveConfirmed
        } else if guard.is_failed() {
            StatType::ActiveTimeout
        } else {
            StatType::ActiveDropped
        }
    }

    pub fn clear(&self) {
        let mut guard = self.mutex.lock().unwrap();
        guard.blocks.clear();
        guard.roots.clear();
        guard.prioritized_count = 0;
    }
}

impl Drop for ActiveTransactions {
    fn drop(&mut self) {
        // Thread must be stopped before destruction
        debug_assert!(self.thread.lock().unwrap().is_none());
    }
}

pub trait ActiveTransactionsExt {
    fn initialize(&self);
    fn start(&self);
    fn stop(&self);
    /// Starts or returns the election for the block's chain slot
    fn insert(
        &self,
        block: &Arc<Block>,
        behavior: ElectionBehavior,
        from_local_wallet: bool,
    ) -> (bool, Option<Arc<Election>>);
    /// Adds a conflicting block to an ongoing election. Returns true when
    /// the block was rejected.
    fn publish_block(&self, block: &Arc<Block>) -> bool;
    /// Replaces the ledger block with a higher work version and restarts
    /// the previously dropped election
    fn restart(&self, block: &Block);
    /// Validates a vote and applies it to every matching election.
    /// Classifies replays; hashes without an election go to the inactive
    /// vote cache.
    fn vote(&self, vote: &Arc<Vote>, source: VoteSource) -> HashMap<BlockHash, VoteCode>;
    fn vote_on_election(
        &self,
        election: &Arc<Election>,
        representative: &PublicKey,
        timestamp: u64,
        hash: &BlockHash,
        source: VoteSource,
    ) -> VoteCode;
    fn confirm_if_quorum(&self, election_lock: MutexGuard<ElectionData>, election: &Arc<Election>);
    fn confirm_once(&self, election_lock: MutexGuard<ElectionData>, election: &Arc<Election>);
    fn force_confirm(&self, election: &Arc<Election>);
    fn try_confirm(&self, election: &Arc<Election>, hash: &BlockHash);
    /// Starts an election for the first uncemented block of the account
    /// whose dependencies are confirmed
    fn activate(&self, account: &Account) -> bool;
    fn block_cemented_callback(&self, notification: &CementedNotification);
    /// Starts at most one pessimistic election for an account whose
    /// optimistic election expired with the frontier still uncemented
    fn confirm_expired_frontiers_pessimistically(&self) -> Option<Arc<Election>>;
    fn erase(&self, root: &QualifiedRoot) -> bool;
    fn request_loop(&self);
    fn trim(&self);
}

impl ActiveTransactionsExt for Arc<ActiveTransactions> {
    fn initialize(&self) {
        let self_weak = Arc::downgrade(self);
        self.confirming_set.on_cemented(Box::new(move |notification| {
            if let Some(active) = self_weak.upgrade() {
                active.block_cemented_callback(notification);
            }
        }));

        let self_weak = Arc::downgrade(self);
        self.confirming_set
            .on_already_cemented(Box::new(move |hash| {
                if let Some(active) = self_weak.upgrade() {
                    // The election winner details can linger if the block was
                    // already cemented when the election confirmed
                    active.remove_election_winner_details(&hash);
                }
            }));
    }

    fn start(&self) {
        let mut guard = self.thread.lock().unwrap();
        debug_assert!(guard.is_none());
        let self_clone = Arc::clone(self);
        *guard = Some(
            std::thread::Builder::new()
                .name("Request loop".to_string())
                .spawn(move || self_clone.request_loop())
                .unwrap(),
        );
    }

    fn stop(&self) {
        self.mutex.lock().unwrap().stopped = true;
        self.condition.notify_all();
        if let Some(handle) = self.thread.lock().unwrap().take() {
            handle.join().unwrap();
        }
        self.clear();
    }

    fn insert(
        &self,
        block: &Arc<Block>,
        behavior: ElectionBehavior,
        from_local_wallet: bool,
    ) -> (bool, Option<Arc<Election>>) {
        let root = block.qualified_root();
        let hash = block.hash();
        let mut election_result = None;
        let mut inserted = false;

        {
            let mut guard = self.mutex.lock().unwrap();
            if guard.stopped {
                return (false, None);
            }

            if let Some(existing) = guard.roots.get(&root) {
                election_result = Some(Arc::clone(existing));
            } else if !self.recently_confirmed.root_exists(&root) {
                inserted = true;

                let multiplier = self.block_multiplier(block);
                let prioritized = multiplier >= self.trended_active_multiplier()
                    && guard.prioritized_count < self.priority_limit();

                let online_reps = Arc::clone(&self.online_reps);
                let observe_rep = Box::new(move |representative| {
                    // A representative is considered online when replying to
                    // live votes
                    online_reps.lock().unwrap().observe(representative);
                });

                let id = NEXT_ELECTION_ID.fetch_add(1, Ordering::Relaxed);
                let election = Arc::new(Election::new(
                    id,
                    Arc::clone(block),
                    behavior,
                    prioritized,
                    from_local_wallet,
                    multiplier,
                    Box::new(|_| {}),
                    observe_rep,
                ));
                guard.roots.insert(root, Arc::clone(&election));
                guard.blocks.insert(hash, Arc::clone(&election));
                if prioritized {
                    guard.prioritized_count += 1;
                }

                self.record_multiplier(multiplier);
                self.stats.inc(StatType::ActiveStarted, DetailType::ElectionStart);
                trace!(behavior = ?behavior, ?election, "active started");
                debug!("Started new election for block: {} (behavior: {:?})", hash, behavior);

                election_result = Some(election);
            }
        }

        if inserted {
            let election = election_result.as_ref().unwrap();
            self.insert_cached_votes(election, &hash);
            {
                let guard = election.mutex.lock().unwrap();
                if !guard.is_confirmed() && !guard.last_votes.is_empty() {
                    self.confirm_if_quorum(guard, election);
                }
            }

            let observers = self.active_started_observers.lock().unwrap();
            for observer in observers.iter() {
                observer(hash);
            }
        }

        self.trim();

        (inserted, election_result)
    }

    fn publish_block(&self, block: &Arc<Block>) -> bool {
        let election = {
            let guard = self.mutex.lock().unwrap();
            guard.roots.get(&block.qualified_root()).cloned()
        };
        let Some(election) = election else {
            return true;
        };

        let hash = block.hash();
        let mut election_guard = election.mutex.lock().unwrap();

        // Do not insert new blocks if already confirmed
        let mut rejected = election_guard.is_confirmed();
        if !rejected && !election_guard.last_blocks.contains_key(&hash) {
            if election_guard.last_blocks.len() >= ELECTION_MAX_BLOCKS {
                // Only blocks backed by a meaningful tally may displace a slot
                let online_stake = self.online_reps.lock().unwrap().online_stake();
                let share = election_guard
                    .last_tally
                    .get(&hash)
                    .copied()
                    .unwrap_or_default();
                if share < online_stake / 10 {
                    rejected = true;
                }
            }
            if !rejected {
                election_guard.last_blocks.insert(hash, Arc::clone(block));
                drop(election_guard);

                {
                    let mut guard = self.mutex.lock().unwrap();
                    guard.blocks.insert(hash, Arc::clone(&election));
                }

                // A fork with higher work raises the election priority
                let multiplier = self.block_multiplier(block);
                if election.update_multiplier(multiplier) {
                    self.stats
                        .inc(StatType::Active, DetailType::ElectionDifficultyUpdate);
                    if !election.prioritized() && multiplier >= self.trended_active_multiplier() {
                        let mut guard = self.mutex.lock().unwrap();
                        if guard.prioritized_count < self.priority_limit() {
                            election.prioritize();
                            guard.prioritized_count += 1;
                        }
                    }
                }

                self.insert_cached_votes(&election, &hash);
                {
                    let guard = election.mutex.lock().unwrap();
                    if !guard.is_confirmed() {
                        self.confirm_if_quorum(guard, &election);
                    }
                }
                self.network.flood_block(block);
                self.stats
                    .inc(StatType::Active, DetailType::ElectionBlockConflict);
                return false;
            }
        } else if !rejected {
            // Same hash again, refresh the stored version (e.g. higher work)
            rejected = true;
            election_guard.last_blocks.insert(hash, Arc::clone(block));
            if election_guard.status.winner.as_ref().unwrap().hash() == hash {
                election_guard.status.winner = Some(Arc::clone(block));
            }
        }

        if rejected {
            self.clear_publish_filter(block);
        }
        rejected
    }

    fn restart(&self, block: &Block) {
        let root = block.qualified_root();
        if self.recently_dropped.find(&root).is_none() {
            return;
        }

        let stored_difficulty = {
            let txn = self.ledger.read_txn();
            match self.ledger.any().get_block(&txn, &block.hash()) {
                Some(stored) => self
                    .network_params
                    .ledger
                    .work
                    .difficulty_block(&stored.block),
                None => return,
            }
        };

        // Only a strictly better work version justifies a restart
        let difficulty = self.network_params.ledger.work.difficulty_block(block);
        if difficulty <= stored_difficulty {
            return;
        }

        {
            let mut txn = self.ledger.rw_txn();
            if !self.ledger.update_block(&mut txn, block) {
                return;
            }
        }
        self.recently_dropped.erase(&root);
        self.stats.inc(StatType::Active, DetailType::ElectionRestart);
        debug!("Restarting election for block: {}", block.hash());

        self.insert(&Arc::new(block.clone()), ElectionBehavior::Normal, false);
    }

    fn vote(&self, vote: &Arc<Vote>, source: VoteSource) -> HashMap<BlockHash, VoteCode> {
        debug_assert!(vote.validate().is_ok());

        let mut results = HashMap::new();
        let mut process = HashMap::new();
        let mut inactive = Vec::new();

        {
            let guard = self.mutex.lock().unwrap();
            for hash in &vote.hashes {
                // Ignore duplicate hashes. A well behaved voting node never
                // sends them.
                if results.contains_key(hash) {
                    continue;
                }

                if let Some(existing) = guard.blocks.get(hash) {
                    process.insert(*hash, Arc::clone(existing));
                } else if !self.recently_confirmed.hash_exists(hash) {
                    inactive.push(*hash);
                    results.insert(*hash, VoteCode::Indeterminate);
                } else {
                    results.insert(*hash, VoteCode::Replay);
                }
            }
        }

        for (hash, election) in process {
            let result = self.vote_on_election(
                &election,
                &vote.voting_account,
                vote.timestamp,
                &hash,
                source,
            );
            results.insert(hash, result);
        }

        // Votes for unknown hashes feed the inactive vote cache; cached
        // votes replayed into the router must not loop back
        if source == VoteSource::Live {
            for hash in inactive {
                self.cache_inactive_vote(&hash, vote);
            }
        }

        results
    }

    fn vote_on_election(
        &self,
        election: &Arc<Election>,
        representative: &PublicKey,
        timestamp: u64,
        hash: &BlockHash,
        source: VoteSource,
    ) -> VoteCode {
        let weight = self.ledger.weight(representative);
        if !self.network_params.network.is_dev_network()
            && weight <= self.online_reps.lock().unwrap().minimum_principal_weight()
        {
            return VoteCode::Indeterminate;
        }

        let mut guard = election.mutex.lock().unwrap();

        if let Some(last_vote) = guard.last_votes.get(representative) {
            // Votes are ordered by (timestamp, hash); older ones are replays
            if last_vote.timestamp > timestamp {
                return VoteCode::Replay;
            }
            if last_vote.timestamp == timestamp && last_vote.hash >= *hash {
                return VoteCode::Replay;
            }

            let max_vote = timestamp == Vote::FINAL_TIMESTAMP && last_vote.timestamp < timestamp;

            let mut past_cooldown = true;
            // Only cooldown live votes
            if source == VoteSource::Live {
                let cooldown = self.cooldown_time(weight);
                past_cooldown = last_vote.time.elapsed() >= cooldown;
            }

            if !max_vote && !past_cooldown {
                return VoteCode::Ignored;
            }
        }

        guard
            .last_votes
            .insert(*representative, super::VoteInfo::new(timestamp, *hash));

        if source == VoteSource::Live {
            (election.live_vote_action)(*representative);
        }

        self.stats.inc(
            StatType::Election,
            if source == VoteSource::Live {
                DetailType::VoteNew
            } else {
                DetailType::VoteCached
            },
        );
        trace!(
            qualified_root = ?election.qualified_root,
            account = %representative,
            %hash,
            timestamp,
            ?source,
            "vote processed"
        );

        if !guard.is_confirmed() {
            self.confirm_if_quorum(guard, election);
        }
        VoteCode::Vote
    }

    fn confirm_if_quorum(
        &self,
        mut election_lock: MutexGuard<ElectionData>,
        election: &Arc<Election>,
    ) {
        let tally = self.tally_impl(&mut election_lock);
        debug_assert!(!tally.is_empty());
        let Some((amount, block)) = tally.first_key_value() else {
            return;
        };
        let winner_hash = block.hash();
        election_lock.status.tally = amount.amount();
        let status_winner_hash = election_lock.status.winner.as_ref().unwrap().hash();

        let mut sum = Amount::zero();
        for key in tally.keys() {
            sum += key.amount();
        }
        if sum >= self.node_config.online_weight_minimum && winner_hash != status_winner_hash {
            // The tally moved to a different fork
            let new_winner = Arc::clone(block);
            election_lock.status.winner = Some(Arc::clone(&new_winner));
            self.remove_votes(election, &mut election_lock, &status_winner_hash);
            self.block_processor.force((*new_winner).clone());
        }

        if self.have_quorum(&tally) {
            self.confirm_once(election_lock, election);
        }
    }

    fn confirm_once(&self, mut election_lock: MutexGuard<ElectionData>, election: &Arc<Election>) {
        // Holding the winner details lock across the state flip keeps
        // dependent confirmations consistent
        let mut winners_guard = self.election_winner_details.lock().unwrap();
        let just_confirmed = election_lock.state != ElectionState::Confirmed;
        election_lock.state = ElectionState::Confirmed;
        election_lock.state_start = Instant::now();
        let winner_hash = election_lock.status.winner.as_ref().unwrap().hash();

        if just_confirmed && !winners_guard.contains_key(&winner_hash) {
            winners_guard.insert(winner_hash, Arc::clone(election));
            drop(winners_guard);

            election_lock
                .update_status_to_confirmed(election, ElectionStatusType::ActiveConfirmedQuorum);
            let status = election_lock.status.clone();

            self.recently_confirmed
                .put(election.qualified_root.clone(), winner_hash);

            trace!(qualified_root = ?election.qualified_root, "election confirmed");
            drop(election_lock);

            let self_clone = Arc::clone(self);
            let election = Arc::clone(election);
            self.workers.push_task(Box::new(move || {
                let block = Arc::clone(status.winner.as_ref().unwrap());
                self_clone.process_confirmed(&election, &block.hash(), 0);
                (election.confirmation_action)(block);
            }));
        }
    }

    fn force_confirm(&self, election: &Arc<Election>) {
        assert!(self.network_params.network.is_dev_network());
        let guard = election.mutex.lock().unwrap();
        self.confirm_once(guard, election);
    }

    fn try_confirm(&self, election: &Arc<Election>, hash: &BlockHash) {
        let guard = election.mutex.lock().unwrap();
        if let Some(winner) = &guard.status.winner {
            if winner.hash() == *hash && !guard.is_confirmed() {
                self.confirm_once(guard, election);
            }
        }
    }

    fn activate(&self, account: &Account) -> bool {
        debug_assert!(!account.is_zero());
        let txn = self.ledger.read_txn();
        let Some(account_info) = self.ledger.any().get_account(&txn, account) else {
            return false;
        };
        let conf_info = self
            .ledger
            .store
            .confirmation_height
            .get(&txn, account)
            .unwrap_or_default();
        if conf_info.height >= account_info.block_count {
            return false;
        }

        // The first block above the cemented frontier
        let hash = match conf_info.height {
            0 => account_info.open_block,
            _ => match self.ledger.any().block_successor(&txn, &conf_info.frontier) {
                Some(successor) => successor,
                None => return false,
            },
        };
        let Some(block) = self.ledger.any().get_block(&txn, &hash) else {
            return false;
        };

        if !self.ledger.dependents_confirmed(&txn, &block) {
            return false;
        }
        drop(txn);

        let (inserted, _) = self.insert(
            &Arc::new(block.block.clone()),
            ElectionBehavior::Normal,
            false,
        );
        inserted
    }

    fn block_cemented_callback(&self, notification: &CementedNotification) {
        let block = &notification.block;
        let hash = block.hash();

        // An election whose winner was cemented by a dependent confirmation
        if let Some(election) = self.election(&block.qualified_root()) {
            self.try_confirm(&election, &hash);
        }

        let election = self.remove_election_winner_details(&hash);
        let mut status = match &election {
            Some(election) => election.mutex.lock().unwrap().status.clone(),
            None => ElectionStatus {
                winner: Some(Arc::new(block.block.clone())),
                ..Default::default()
            },
        };
        let was_active = election.is_some() || notification.election.is_some();
        status.election_status_type = if notification.election.is_some() {
            ElectionStatusType::ActiveConfirmedQuorum
        } else if election.is_some() {
            ElectionStatusType::ActiveConfirmationHeight
        } else {
            ElectionStatusType::InactiveConfirmationHeight
        };
        self.stats.inc(
            StatType::ConfirmingSet,
            match status.election_status_type {
                ElectionStatusType::ActiveConfirmedQuorum => DetailType::ActiveQuorum,
                ElectionStatusType::ActiveConfirmationHeight => DetailType::ActiveConfHeight,
                _ => DetailType::InactiveConfHeight,
            },
        );

        self.recently_cemented.lock().unwrap().push_back(status.clone());

        {
            let observers = self.election_end_observers.lock().unwrap();
            for observer in observers.iter() {
                observer(&status);
            }
        }

        // Cementing unblocks the account's next block, and for sends the
        // receiving account
        let cemented_bootstrap_count_reached =
            self.ledger.cemented_count() >= self.ledger.bootstrap_weight_max_blocks();
        if cemented_bootstrap_count_reached && was_active {
            self.activate(&block.account());
            if block.is_send() {
                let destination = block.destination_or_link();
                if !destination.is_zero() && destination != block.account() {
                    self.activate(&destination);
                }
            }
        }
    }

    fn confirm_expired_frontiers_pessimistically(&self) -> Option<Arc<Election>> {
        let accounts: Vec<Account> = {
            let guard = self.expired_optimistic.lock().unwrap();
            guard.by_account.keys().copied().collect()
        };

        for account in accounts {
            let txn = self.ledger.read_txn();
            let Some(account_info) = self.ledger.any().get_account(&txn, &account) else {
                self.expired_optimistic.lock().unwrap().by_account.remove(&account);
                continue;
            };
            let conf_height = self.ledger.confirmed().account_height(&txn, &account);
            if conf_height >= account_info.block_count {
                // Frontier got cemented, nothing left to do here
                self.expired_optimistic.lock().unwrap().by_account.remove(&account);
                continue;
            }

            // The next uncemented block in the chain
            let hash = match conf_height {
                0 => account_info.open_block,
                _ => {
                    let frontier = self
                        .ledger
                        .store
                        .confirmation_height
                        .get(&txn, &account)
                        .unwrap_or_default()
                        .frontier;
                    match self.ledger.any().block_successor(&txn, &frontier) {
                        Some(successor) => successor,
                        None => continue,
                    }
                }
            };

            let Some(block) = self.ledger.any().get_block(&txn, &hash) else {
                continue;
            };
            let root = block.qualified_root();
            drop(txn);

            {
                let guard = self.expired_optimistic.lock().unwrap();
                let started = guard.by_account.get(&account).copied().unwrap_or(false);
                if started && self.active_root(&root) {
                    // A pessimistic election is still in flight, wait for it
                    // to cement before starting the next one
                    return None;
                }
            }

            let (inserted, election) = self.insert(
                &Arc::new(block.block.clone()),
                ElectionBehavior::Normal,
                false,
            );
            if inserted {
                self.expired_optimistic
                    .lock()
                    .unwrap()
                    .by_account
                    .insert(account, true);
                self.stats
                    .inc(StatType::Active, DetailType::ConfirmExpiredPessimistically);
                return election;
            }
        }
        None
    }

    fn erase(&self, root: &QualifiedRoot) -> bool {
        let guard = self.mutex.lock().unwrap();
        if let Some(election) = guard.roots.get(root) {
            let election = Arc::clone(election);
            self.cleanup_election(guard, &election);
            true
        } else {
            false
        }
    }

    fn request_loop(&self) {
        let mut guard = self.mutex.lock().unwrap();
        while !guard.stopped {
            let stamp = Instant::now();
            self.stats.inc(StatType::Active, DetailType::Loop);
            guard = self.request_confirm(guard);

            if !guard.stopped {
                let loop_interval = self.network_params.network.aec_loop_interval();
                let min_sleep = loop_interval / 2;
                let wait_duration = max(
                    min_sleep,
                    (stamp + loop_interval).saturating_duration_since(Instant::now()),
                );
                guard = self
                    .condition
                    .wait_timeout_while(guard, wait_duration, |data| !data.stopped)
                    .unwrap()
                    .0;
            }
        }
    }

    fn trim(&self) {
        while self.len() > self.config.size {
            let victim = {
                let guard = self.mutex.lock().unwrap();
                // Oldest, least prioritized unconfirmed election goes first;
                // local wallet sends are never dropped
                let mut candidate = None;
                for (_, election) in guard.roots.iter_sequenced() {
                    if election.from_local_wallet {
                        continue;
                    }
                    if election.mutex.lock().unwrap().is_confirmed() {
                        continue;
                    }
                    if election.prioritized() {
                        if candidate.is_none() {
                            candidate = Some(Arc::clone(election));
                        }
                        continue;
                    }
                    candidate = Some(Arc::clone(election));
                    break;
                }
                candidate
            };

            let Some(election) = victim else {
                break;
            };
            self.stats
                .inc(StatType::Active, DetailType::ElectionDropOverflow);
            let guard = self.mutex.lock().unwrap();
            self.cleanup_election(guard, &election);
        }
    }
}

/// Internal operations that need a shared handle to spawn follow-up work
pub(crate) trait ActiveTransactionsInternal {
    fn request_confirm<'a>(
        &'a self,
        guard: MutexGuard<'a, ActiveTransactionsData>,
    ) -> MutexGuard<'a, ActiveTransactionsData>;
    fn erase_internal(&self, election: &Arc<Election>);
    fn transition_time(
        &self,
        solicitor: &mut ConfirmationSolicitor,
        election: &Arc<Election>,
    ) -> bool;
    fn cleanup_election(
        &self,
        guard: MutexGuard<ActiveTransactionsData>,
        election: &Arc<Election>,
    );
    fn process_confirmed(&self, election: &Arc<Election>, hash: &BlockHash, iteration: u32);
    fn cache_inactive_vote(&self, hash: &BlockHash, vote: &Arc<Vote>);
    fn activate_deferred(&self, block: &Block);
    fn broadcast_vote(&self, election: &Election, guard: &mut MutexGuard<ElectionData>);
    fn broadcast_block(
        &self,
        solicitor: &mut ConfirmationSolicitor,
        guard: &mut MutexGuard<ElectionData>,
    );
    fn send_confirm_req(
        &self,
        solicitor: &mut ConfirmationSolicitor,
        election: &Election,
        guard: &mut MutexGuard<ElectionData>,
    );
}

impl ActiveTransactionsInternal for Arc<ActiveTransactions> {
    fn request_confirm<'a>(
        &'a self,
        guard: MutexGuard<'a, ActiveTransactionsData>,
    ) -> MutexGuard<'a, ActiveTransactionsData> {
        let elections: Vec<Arc<Election>> = guard
            .roots
            .iter_sequenced()
            .map(|(_, election)| Arc::clone(election))
            .collect();
        drop(guard);

        let mut solicitor = ConfirmationSolicitor::new(&self.network);
        solicitor.prepare(self.network.channels());

        /*
         * Loop through active elections in insertion order, requesting
         * confirmation. Elections that reached a terminal state are erased;
         * the remaining ones can still confirm when votes arrive.
         */
        for election in &elections {
            if self.transition_time(&mut solicitor, election) {
                self.erase_internal(election);
            }
        }

        solicitor.flush();
        self.mutex.lock().unwrap()
    }

    fn erase_internal(&self, election: &Arc<Election>) {
        let guard = self.mutex.lock().unwrap();
        if guard.roots.get(&election.qualified_root).is_some() {
            self.cleanup_election(guard, election);
        }
    }

    fn transition_time(
        &self,
        solicitor: &mut ConfirmationSolicitor,
        election: &Arc<Election>,
    ) -> bool {
        let mut guard = election.mutex.lock().unwrap();
        let mut done = false;
        match guard.state {
            ElectionState::Passive => {
                if self.base_latency() * Election::PASSIVE_DURATION_FACTOR
                    < guard.state_start.elapsed()
                {
                    let _ = guard.state_change(ElectionState::Passive, ElectionState::Active);
                }
            }
            ElectionState::Active => {
                self.broadcast_vote(election, &mut guard);
                self.send_confirm_req(solicitor, election, &mut guard);
                if election.confirmation_request_count.load(Ordering::SeqCst)
                    > Election::ACTIVE_REQUEST_COUNT_MIN
                {
                    let _ = guard.state_change(ElectionState::Active, ElectionState::Broadcasting);
                }
            }
            ElectionState::Broadcasting => {
                self.broadcast_vote(election, &mut guard);
                self.broadcast_block(solicitor, &mut guard);
                self.send_confirm_req(solicitor, election, &mut guard);
            }
            ElectionState::Confirmed => {
                if self.base_latency() * Election::CONFIRMED_DURATION_FACTOR
                    < guard.state_start.elapsed()
                {
                    done = true;
                    let _ =
                        guard.state_change(ElectionState::Confirmed, ElectionState::ExpiredConfirmed);
                }
            }
            ElectionState::ExpiredConfirmed | ElectionState::ExpiredUnconfirmed => {
                unreachable!()
            }
        }

        if !guard.is_confirmed() && self.time_to_live(election) < election.election_start.elapsed()
        {
            let state = guard.state;
            if guard
                .state_change(state, ElectionState::ExpiredUnconfirmed)
                .is_ok()
            {
                trace!(qualified_root = ?election.qualified_root, "election expired");
                done = true;
                guard.status.election_status_type = ElectionStatusType::Stopped;

                if election.is_optimistic() {
                    // Remember the account for pessimistic frontier
                    // confirmation
                    let winner_hash = guard.status.winner.as_ref().unwrap().hash();
                    drop(guard);
                    let txn = self.ledger.read_txn();
                    if let Some(account) = self.ledger.any().block_account(&txn, &winner_hash) {
                        self.expired_optimistic
                            .lock()
                            .unwrap()
                            .by_account
                            .entry(account)
                            .or_insert(false);
                    }
                    return done;
                }
            }
        }

        done
    }

    /// Queues a local vote for the current winner, rate limited per election
    fn broadcast_vote(&self, election: &Election, guard: &mut MutexGuard<ElectionData>) {
        let elapsed = guard
            .last_vote
            .map(|instant| instant.elapsed())
            .unwrap_or(Duration::MAX);
        if elapsed < self.vote_broadcast_interval() {
            return;
        }
        guard.last_vote = Some(Instant::now());

        if self.node_config.enable_voting && self.wallets.voting_reps_count() > 0 {
            self.stats.inc(StatType::Election, DetailType::BroadcastVote);
            let winner_hash = guard.status.winner.as_ref().unwrap().hash();
            self.generator.add(&election.root, &winner_hash);
        }
    }

    fn broadcast_block(
        &self,
        solicitor: &mut ConfirmationSolicitor,
        guard: &mut MutexGuard<ElectionData>,
    ) {
        let winner_hash = guard.status.winner.as_ref().unwrap().hash();
        let elapsed = guard
            .last_block_time
            .map(|instant| instant.elapsed())
            .unwrap_or(Duration::MAX);
        // Broadcast if enough time has passed, or the winner changed
        if elapsed >= self.block_broadcast_interval() || winner_hash != guard.last_block_hash {
            if solicitor.broadcast(guard).is_ok() {
                self.stats.inc(
                    StatType::Election,
                    if guard.last_block_hash.is_zero() {
                        DetailType::BroadcastBlockInitial
                    } else {
                        DetailType::BroadcastBlockRepeat
                    },
                );
                guard.last_block_time = Some(Instant::now());
                guard.last_block_hash = winner_hash;
            }
        }
    }

    fn send_confirm_req(
        &self,
        solicitor: &mut ConfirmationSolicitor,
        election: &Election,
        guard: &mut MutexGuard<ElectionData>,
    ) {
        let elapsed = guard
            .last_req
            .map(|instant| instant.elapsed())
            .unwrap_or(Duration::MAX);
        if self.confirm_req_time(election) < elapsed {
            if !solicitor.add(election, guard) {
                guard.last_req = Some(Instant::now());
                election
                    .confirmation_request_count
                    .fetch_add(1, Ordering::SeqCst);
                self.stats.inc(StatType::Election, DetailType::ConfirmReq);
            }
        }
    }

    /// Erase all blocks from active and, if not confirmed, clear digests
    /// from the network duplicate filter so the blocks can be seen again
    fn cleanup_election(
        &self,
        mut guard: MutexGuard<ActiveTransactionsData>,
        election: &Arc<Election>,
    ) {
        let (blocks, winner_hash, confirmed) = {
            let election_guard = election.mutex.lock().unwrap();
            (
                election_guard.last_blocks.clone(),
                election_guard.status.winner.as_ref().unwrap().hash(),
                election_guard.is_confirmed(),
            )
        };

        for hash in blocks.keys() {
            guard.blocks.remove(hash);
        }
        guard.roots.erase(&election.qualified_root);
        if election.prioritized() && guard.prioritized_count > 0 {
            guard.prioritized_count -= 1;
        }
        drop(guard);

        self.stats
            .inc(self.completion_stat(election), DetailType::All);
        trace!(?election, "active stopped");
        debug!(
            "Erased election for blocks: {} (behavior: {:?})",
            blocks
                .keys()
                .map(|key| key.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            election.behavior,
        );

        self.stats.sample(
            Sample::ActiveElectionDuration,
            election.duration().as_millis() as i64,
        );

        if !confirmed {
            self.recently_dropped.add(election.qualified_root.clone());
        }

        {
            let observers = self.active_stopped_observers.lock().unwrap();
            for (hash, _) in &blocks {
                // Notify about dropped elections and blocks that lost
                if !confirmed || *hash != winner_hash {
                    for observer in observers.iter() {
                        observer(*hash);
                    }
                }
            }
        }

        if !confirmed {
            // Clear the duplicate filter on a worker, the request loop
            // should not pay for it
            let network = Arc::clone(&self.network);
            let lost: Vec<Arc<Block>> = blocks.values().cloned().collect();
            self.workers.push_task(Box::new(move || {
                for block in lost {
                    network.publish_filter.clear(&block);
                }
            }));
        }
    }

    fn process_confirmed(&self, election: &Arc<Election>, hash: &BlockHash, iteration: u32) {
        const MAX_ITERATIONS: u32 = 4 * 60;
        let exists = {
            let txn = self.ledger.read_txn();
            self.ledger.any().block_exists(&txn, hash)
        };
        if exists {
            self.confirming_set
                .add_with_election(*hash, Some(Arc::clone(election)));
        } else if iteration < MAX_ITERATIONS {
            // The winner may still be sitting in the block processor queue
            let self_weak = Arc::downgrade(self);
            let election = Arc::clone(election);
            let hash = *hash;
            self.workers.add_delayed_task(
                Duration::from_millis(50),
                Box::new(move || {
                    if let Some(self_strong) = self_weak.upgrade() {
                        self_strong.process_confirmed(&election, &hash, iteration + 1);
                    }
                }),
            );
        } else {
            // The block never arrived, drop the winner bookkeeping
            self.remove_election_winner_details(hash);
        }
    }

    /// Routes a vote for an unknown hash into the inactive vote cache and
    /// fires the bootstrap and election-start triggers
    fn cache_inactive_vote(&self, hash: &BlockHash, vote: &Arc<Vote>) {
        let delta = self.online_reps.lock().unwrap().delta();
        let ledger = Arc::clone(&self.ledger);
        let (_entry, triggers) = self.vote_cache.lock().unwrap().vote(
            hash,
            &vote.voting_account,
            vote.timestamp,
            delta,
            |representative| ledger.weight(representative),
        );

        if triggers.start_bootstrap {
            self.stats
                .inc(StatType::VoteCache, DetailType::BootstrapStarted);
            let exists = {
                let txn = self.ledger.read_txn();
                self.ledger.any().block_exists(&txn, hash)
            };
            if !exists {
                if let Some(callback) = self.bootstrap_callback.lock().unwrap().as_ref() {
                    callback(*hash);
                }
            }
        }

        if triggers.start_election {
            // If the block is already in the ledger an election can start
            // right away; otherwise it starts when the block arrives
            let block = {
                let txn = self.ledger.read_txn();
                self.ledger.any().get_block(&txn, hash)
            };
            if let Some(block) = block {
                self.stats
                    .inc(StatType::Active, DetailType::ElectionHintedStart);
                self.insert(
                    &Arc::new(block.block.clone()),
                    ElectionBehavior::Normal,
                    false,
                );
            }
        }
    }

    /// Called when a block with a cached election-start trigger finally
    /// arrives in the ledger
    fn activate_deferred(&self, block: &Block) {
        let pending_start = {
            let cache = self.vote_cache.lock().unwrap();
            cache
                .find(&block.hash())
                .map(|entry| entry.status.election_started)
                .unwrap_or(false)
        };
        if pending_start && !self.active_block(&block.hash()) {
            self.stats
                .inc(StatType::Active, DetailType::ElectionHintedStart);
            self.insert(&Arc::new(block.clone()), ElectionBehavior::Normal, false);
        }
    }
}

use crate::{
    block_processing::{BlockProcessor, BlockProcessorConfig, BlockProcessorExt, BlockSource},
    cementation::{ConfirmingSet, ConfirmingSetExt},
    config::{NetworkParams, NodeConfig},
    consensus::{
        ActiveTransactions, ActiveTransactionsExt, ActiveTransactionsInternal, ElectionBehavior,
        LocalVoteHistory, RequestAggregator, RequestAggregatorExt, VoteCache, VoteGenerator,
        VoteGeneratorExt, VoteProcessor, VoteProcessorExt, VoteProcessorQueue,
    },
    representatives::{OnlineReps, OnlineWeightSampler},
    stats::Stats,
    transport::{Channel, ChannelId, Network},
    utils::{ThreadPool, ThreadPoolImpl},
    wallets::Wallets,
};
use std::{
    sync::{Arc, Condvar, Mutex},
    thread::JoinHandle,
};
use vanta_core::{work::WorkPoolImpl, Amount, Block, BlockHash, PrivateKey, Root, Vote, VoteSource};
use vanta_ledger::Ledger;
use vanta_store::Store;

/// The wired consensus core. Construction wires the components together;
/// `start` spins up the worker threads.
pub struct Node {
    pub config: NodeConfig,
    pub network_params: NetworkParams,
    pub ledger: Arc<Ledger>,
    pub stats: Arc<Stats>,
    pub workers: Arc<ThreadPoolImpl>,
    pub work_pool: Arc<WorkPoolImpl>,
    pub network: Arc<Network>,
    pub wallets: Arc<Wallets>,
    pub online_reps: Arc<Mutex<OnlineReps>>,
    pub online_weight_sampler: Arc<OnlineWeightSampler>,
    pub local_votes: Arc<LocalVoteHistory>,
    pub generator: Arc<VoteGenerator>,
    pub vote_processor_queue: Arc<VoteProcessorQueue>,
    pub vote_processor: Arc<VoteProcessor>,
    pub block_processor: Arc<BlockProcessor>,
    pub confirming_set: Arc<ConfirmingSet>,
    pub active: Arc<ActiveTransactions>,
    pub aggregator: Arc<RequestAggregator>,
    sampler_stop: Arc<(Mutex<bool>, Condvar)>,
    sampler_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Node {
    pub fn new(store: Store, config: NodeConfig, network_params: NetworkParams) -> Arc<Self> {
        let stats = Arc::new(Stats::new());
        let ledger = Arc::new(
            Ledger::new(store, network_params.ledger.clone()).expect("ledger failed to start"),
        );
        let workers: Arc<ThreadPoolImpl> = Arc::new(ThreadPoolImpl::create(2, "Worker"));
        let work_pool = Arc::new(WorkPoolImpl::new(network_params.ledger.work.clone()));
        let network = Arc::new(Network::new());
        let wallets = Arc::new(Wallets::new(Arc::clone(&ledger), Arc::clone(&work_pool)));

        let online_reps = Arc::new(Mutex::new(OnlineReps::new(
            Arc::clone(&ledger),
            network_params.network.weight_period(),
            config.online_weight_minimum,
        )));
        let online_weight_sampler = Arc::new(OnlineWeightSampler::new(
            Arc::clone(&ledger),
            config.max_weight_samples,
            config.weight_trend_window,
        ));

        let local_votes = Arc::new(LocalVoteHistory::new(2048));
        let generator = Arc::new(VoteGenerator::new(
            Arc::clone(&ledger),
            Arc::clone(&wallets),
            Arc::clone(&local_votes),
            Arc::clone(&network),
            Arc::clone(&stats),
            network_params.network.vote_spacing_delay(),
            network_params.network.vote_generator_delay(),
        ));

        let block_processor = Arc::new(BlockProcessor::new(
            BlockProcessorConfig::default(),
            Arc::clone(&ledger),
            Arc::clone(&stats),
        ));
        let confirming_set = Arc::new(ConfirmingSet::new(
            config.confirming_set.clone(),
            Arc::clone(&ledger),
            Arc::clone(&stats),
        ));
        let vote_cache = Arc::new(Mutex::new(VoteCache::new(
            config.vote_cache.clone(),
            Arc::clone(&stats),
        )));

        let active = Arc::new(ActiveTransactions::new(
            network_params.clone(),
            config.clone(),
            Arc::clone(&ledger),
            Arc::clone(&confirming_set),
            Arc::clone(&wallets),
            Arc::clone(&network),
            Arc::clone(&stats),
            workers.clone() as Arc<dyn ThreadPool>,
            Arc::clone(&online_reps),
            vote_cache,
            Arc::clone(&local_votes),
            Arc::clone(&generator),
            Arc::clone(&block_processor),
        ));

        let vote_processor_queue = Arc::new(VoteProcessorQueue::new(
            config.vote_processor.clone(),
            Arc::clone(&stats),
        ));
        let vote_processor = Arc::new(VoteProcessor::new(
            Arc::clone(&vote_processor_queue),
            Arc::clone(&active),
            Arc::clone(&stats),
        ));

        let aggregator = Arc::new(RequestAggregator::new(
            &network_params.network,
            config.request_aggregator.clone(),
            Arc::clone(&stats),
            Arc::clone(&ledger),
            Arc::clone(&local_votes),
            Arc::clone(&generator),
            Arc::clone(&active),
        ));

        let node = Arc::new(Self {
            config,
            network_params,
            ledger,
            stats,
            workers,
            work_pool,
            network,
            wallets,
            online_reps,
            online_weight_sampler,
            local_votes,
            generator,
            vote_processor_queue,
            vote_processor,
            block_processor,
            confirming_set,
            active,
            aggregator,
            sampler_stop: Arc::new((Mutex::new(false), Condvar::new())),
            sampler_thread: Mutex::new(None),
        });

        node.wire_components();
        node
    }

    fn wire_components(&self) {
        self.active.initialize();

        // Route processed block outcomes back into consensus
        let active_weak = Arc::downgrade(&self.active);
        self.block_processor
            .add_block_processed_observer(Box::new(move |status, context, _saved| {
                let Some(active) = active_weak.upgrade() else {
                    return;
                };
                use vanta_ledger::BlockStatus;
                match status {
                    BlockStatus::Progress => {
                        // Every applied live block may start an election;
                        // local wallet sends get a non droppable one
                        active.insert(
                            &Arc::new(context.block.clone()),
                            ElectionBehavior::Normal,
                            context.source == BlockSource::Local,
                        );
                        active.activate_deferred(&context.block);
                    }
                    BlockStatus::Fork => {
                        active.publish_block(&Arc::new(context.block.clone()));
                    }
                    BlockStatus::Old => {
                        // A higher work version may restart a dropped election
                        active.restart(&context.block);
                    }
                    _ => {}
                }
            }));

        // Locally generated votes feed back into our own elections
        let queue_weak = Arc::downgrade(&self.vote_processor_queue);
        self.generator.on_vote_generated(Box::new(move |vote| {
            if let Some(queue) = queue_weak.upgrade() {
                queue.vote(Arc::clone(vote), ChannelId::LOOPBACK, VoteSource::Live);
            }
        }));
    }

    pub fn start(&self) {
        self.block_processor.start();
        self.confirming_set.start();
        self.active.start();
        self.vote_processor.start();
        self.generator.start();
        self.aggregator.start();
        self.start_online_weight_sampling();
    }

    fn start_online_weight_sampling(&self) {
        let period = self.network_params.network.weight_period();
        let online_reps = Arc::clone(&self.online_reps);
        let sampler = Arc::clone(&self.online_weight_sampler);
        let stop = Arc::clone(&self.sampler_stop);
        *self.sampler_thread.lock().unwrap() = Some(
            std::thread::Builder::new()
                .name("Online weight".to_string())
                .spawn(move || {
                    let (lock, condition) = &*stop;
                    let mut stopped = lock.lock().unwrap();
                    while !*stopped {
                        stopped = condition.wait_timeout(stopped, period).unwrap().0;
                        if *stopped {
                            break;
                        }
                        let online = {
                            let mut guard = online_reps.lock().unwrap();
                            let online = guard.online_weight();
                            guard.clear();
                            online
                        };
                        sampler.sample(online);
                        let trend = sampler.calculate_trend();
                        online_reps.lock().unwrap().set_trended(trend);
                    }
                })
                .unwrap(),
        );
    }

    pub fn stop(&self) {
        {
            let (lock, condition) = &*self.sampler_stop;
            *lock.lock().unwrap() = true;
            condition.notify_all();
        }
        if let Some(handle) = self.sampler_thread.lock().unwrap().take() {
            handle.join().unwrap();
        }
        self.aggregator.stop();
        self.generator.stop();
        self.vote_processor.stop();
        self.active.stop();
        self.confirming_set.stop();
        self.block_processor.stop();
        self.workers.stop();
    }

    /// Entry point for blocks received from the network
    pub fn process_active(&self, block: Block) {
        self.block_processor.add(block, BlockSource::Live, None);
    }

    /// Entry point for locally created blocks; their elections are shielded
    /// from overflow drops
    pub fn process_local(&self, block: Block) {
        self.block_processor.add(block, BlockSource::Local, None);
    }

    /// Entry point for votes received from the network
    pub fn vote(&self, vote: Arc<Vote>, channel_id: ChannelId) -> bool {
        self.vote_processor_queue
            .vote(vote, channel_id, VoteSource::Live)
    }

    /// Entry point for batched confirmation requests from a peer
    pub fn confirm_req(&self, channel: Arc<Channel>, hashes_roots: &[(BlockHash, Root)]) {
        self.aggregator.add(channel, hashes_roots);
    }

    /// Creates, signs and processes a send from a wallet account
    pub fn send_action(
        &self,
        key: &PrivateKey,
        destination: vanta_core::Account,
        amount: Amount,
    ) -> anyhow::Result<Block> {
        let block = self.wallets.send_action(key, destination, amount)?;
        self.process_local(block.clone());
        Ok(block)
    }

    pub fn block_confirmed(&self, hash: &BlockHash) -> bool {
        let txn = self.ledger.read_txn();
        self.ledger.confirmed().block_exists(&txn, hash)
    }

    pub fn work_generate_dev(&self, root: impl Into<Root>) -> u64 {
        self.work_pool.generate_dev(root)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.stop();
    }
}

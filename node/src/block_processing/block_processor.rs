use super::UncheckedMap;
use crate::{
    stats::{DetailType, StatType, Stats},
    transport::ChannelId,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Condvar, Mutex},
    thread::JoinHandle,
};
use tracing::{debug, trace};
use vanta_core::{Block, SavedBlock};
use vanta_ledger::{BlockStatus, Ledger, Writer};
use vanta_store::WriteTransaction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockSource {
    /// Received from the network
    Live,
    /// Created by a local wallet
    Local,
    /// Re-queued after its missing dependency arrived
    Unchecked,
    /// Injected to resolve a fork, may roll back the competitor
    Forced,
}

#[derive(Clone)]
pub struct BlockContext {
    pub block: Block,
    pub source: BlockSource,
    pub channel_id: Option<ChannelId>,
}

pub type BlockProcessedCallback =
    Box<dyn Fn(BlockStatus, &BlockContext, Option<&SavedBlock>) + Send + Sync>;

#[derive(Clone, Debug)]
pub struct BlockProcessorConfig {
    pub max_queue: usize,
    pub batch_size: usize,
    pub max_unchecked: u64,
}

impl Default for BlockProcessorConfig {
    fn default() -> Self {
        Self {
            max_queue: 8 * 1024,
            batch_size: 256,
            max_unchecked: 64 * 1024,
        }
    }
}

struct BlockProcessorQueues {
    queue: VecDeque<BlockContext>,
    forced: VecDeque<Block>,
    stopped: bool,
}

/// Single worker draining the queue of incoming blocks, applying them
/// through the ledger under the write queue and publishing the per-block
/// results to observers.
pub struct BlockProcessor {
    config: BlockProcessorConfig,
    ledger: Arc<Ledger>,
    stats: Arc<Stats>,
    pub unchecked: UncheckedMap,
    mutex: Mutex<BlockProcessorQueues>,
    condition: Condvar,
    thread: Mutex<Option<JoinHandle<()>>>,
    observers: Mutex<Vec<BlockProcessedCallback>>,
}

impl BlockProcessor {
    pub fn new(config: BlockProcessorConfig, ledger: Arc<Ledger>, stats: Arc<Stats>) -> Self {
        Self {
            unchecked: UncheckedMap::new(
                Arc::clone(&ledger),
                Arc::clone(&stats),
                config.max_unchecked,
            ),
            config,
            ledger,
            stats,
            mutex: Mutex::new(BlockProcessorQueues {
                queue: VecDeque::new(),
                forced: VecDeque::new(),
                stopped: false,
            }),
            condition: Condvar::new(),
            thread: Mutex::new(None),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn add_block_processed_observer(&self, observer: BlockProcessedCallback) {
        self.observers.lock().unwrap().push(observer);
    }

    /// Queues a block for processing; full queues drop and count
    pub fn add(&self, block: Block, source: BlockSource, channel_id: Option<ChannelId>) -> bool {
        debug_assert!(source != BlockSource::Forced);
        let added = {
            let mut guard = self.mutex.lock().unwrap();
            if guard.queue.len() >= self.config.max_queue {
                false
            } else {
                guard.queue.push_back(BlockContext {
                    block,
                    source,
                    channel_id,
                });
                true
            }
        };
        if added {
            self.condition.notify_all();
            self.stats.inc(StatType::BlockProcessor, DetailType::Process);
        } else {
            self.stats.inc(StatType::BlockProcessor, DetailType::Overfill);
        }
        added
    }

    /// Forces a block in, rolling back any competitor occupying its slot
    pub fn force(&self, block: Block) {
        {
            let mut guard = self.mutex.lock().unwrap();
            guard.forced.push_back(block);
        }
        self.condition.notify_all();
        self.stats.inc(StatType::BlockProcessor, DetailType::Forced);
    }

    pub fn queue_len(&self) -> usize {
        let guard = self.mutex.lock().unwrap();
        guard.queue.len() + guard.forced.len()
    }

    fn have_work(queues: &BlockProcessorQueues) -> bool {
        !queues.queue.is_empty() || !queues.forced.is_empty()
    }

    fn run(&self) {
        let mut guard = self.mutex.lock().unwrap();
        while !guard.stopped {
            if Self::have_work(&guard) {
                let mut batch = Vec::new();
                while batch.len() < self.config.batch_size {
                    if let Some(forced) = guard.forced.pop_front() {
                        batch.push(BlockContext {
                            block: forced,
                            source: BlockSource::Forced,
                            channel_id: None,
                        });
                    } else if let Some(context) = guard.queue.pop_front() {
                        batch.push(context);
                    } else {
                        break;
                    }
                }
                drop(guard);

                self.process_batch(batch);
                guard = self.mutex.lock().unwrap();
            } else {
                guard = self
                    .condition
                    .wait_while(guard, |queues| {
                        !queues.stopped && !Self::have_work(queues)
                    })
                    .unwrap();
            }
        }
    }

    fn process_batch(&self, batch: Vec<BlockContext>) {
        let mut results = Vec::with_capacity(batch.len());
        {
            let _write_guard = self.ledger.write_queue.wait(Writer::ProcessBatch);
            let mut txn = self.ledger.rw_txn();
            for context in batch {
                let (status, saved) = self.process_one(&mut txn, &context);
                results.push((status, context, saved));
            }
        }

        // Notify outside the write lock
        let observers = self.observers.lock().unwrap();
        for (status, context, saved) in &results {
            for observer in observers.iter() {
                observer(*status, context, saved.as_ref());
            }
        }
    }

    fn process_one(
        &self,
        txn: &mut WriteTransaction,
        context: &BlockContext,
    ) -> (BlockStatus, Option<SavedBlock>) {
        let block = &context.block;
        let mut result = self.ledger.process(txn, block);

        if matches!(result, Err(BlockStatus::Fork)) && context.source == BlockSource::Forced {
            self.rollback_competitor(txn, block);
            result = self.ledger.process(txn, block);
        }

        let status = match &result {
            Ok(_) => BlockStatus::Progress,
            Err(status) => *status,
        };
        self.stats.inc(StatType::Ledger, status.into());
        trace!(hash = %block.hash(), result = status.as_str(), "block processed");

        match status {
            BlockStatus::Progress => {
                // Blocks waiting on this one can be retried now
                for waiting in self.unchecked.trigger(&block.hash()) {
                    self.add(waiting, BlockSource::Unchecked, None);
                }
            }
            BlockStatus::GapPrevious => {
                self.unchecked.put(block.previous(), block);
            }
            BlockStatus::GapSource => {
                let dependency = block
                    .source_field()
                    .unwrap_or_else(|| block.link_field().unwrap_or_default().into());
                self.unchecked.put(dependency, block);
            }
            _ => {}
        }

        (status, result.ok())
    }

    fn rollback_competitor(&self, txn: &mut WriteTransaction, block: &Block) {
        let competitor_hash = if block.previous().is_zero() {
            // An open fork, the competitor is the stored open block
            self.ledger
                .any()
                .get_account(txn, &block.account_field().unwrap_or_default())
                .map(|info| info.open_block)
        } else {
            self.ledger.any().block_successor(txn, &block.previous())
        };

        let Some(competitor_hash) = competitor_hash else {
            return;
        };
        if competitor_hash == block.hash() {
            return;
        }
        // Cemented competitors win; the forced block is the loser then
        if self.ledger.confirmed().block_exists(txn, &competitor_hash) {
            self.stats
                .inc(StatType::BlockProcessor, DetailType::RollbackFailed);
            return;
        }

        debug!(
            "Rolling back: {} and replacing with: {}",
            competitor_hash,
            block.hash()
        );
        match self.ledger.rollback(txn, &competitor_hash) {
            Ok(_) => self.stats.inc(StatType::BlockProcessor, DetailType::Rollback),
            Err(_) => self
                .stats
                .inc(StatType::BlockProcessor, DetailType::RollbackFailed),
        }
    }

    pub fn stop(&self) {
        self.mutex.lock().unwrap().stopped = true;
        self.condition.notify_all();
        if let Some(handle) = self.thread.lock().unwrap().take() {
            handle.join().unwrap();
        }
    }
}

pub trait BlockProcessorExt {
    fn start(&self);
}

impl BlockProcessorExt for Arc<BlockProcessor> {
    fn start(&self) {
        let mut guard = self.thread.lock().unwrap();
        debug_assert!(guard.is_none());
        let self_clone = Arc::clone(self);
        *guard = Some(
            std::thread::Builder::new()
                .name("Blck processing".to_string())
                .spawn(move || self_clone.run())
                .unwrap(),
        );
    }
}

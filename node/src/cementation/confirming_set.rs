use crate::{
    consensus::Election,
    stats::{DetailType, StatType, Stats},
};
use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Condvar, Mutex},
    thread::JoinHandle,
};
use tracing::debug;
use vanta_core::{BlockHash, SavedBlock};
use vanta_ledger::{Ledger, Writer};

#[derive(Clone, Debug, PartialEq)]
pub struct ConfirmingSetConfig {
    pub batch_size: usize,
    /// Maximum number of dependent blocks cemented per ledger call
    pub max_blocks: usize,
}

impl Default for ConfirmingSetConfig {
    fn default() -> Self {
        Self {
            batch_size: 256,
            max_blocks: 128 * 128,
        }
    }
}

/// One cemented block, together with the confirmation that caused it
pub struct CementedNotification {
    pub block: SavedBlock,
    pub confirmation_root: BlockHash,
    /// The election whose winner triggered this cementation, if any
    pub election: Option<Arc<Election>>,
}

struct Entry {
    hash: BlockHash,
    election: Option<Arc<Election>>,
}

struct ConfirmingSetState {
    set: VecDeque<Entry>,
    set_hashes: HashSet<BlockHash>,
    /// Hashes currently being cemented by the worker
    current: HashSet<BlockHash>,
    stopped: bool,
}

type CementedCallback = Box<dyn Fn(&CementedNotification) + Send + Sync>;
type AlreadyCementedCallback = Box<dyn Fn(BlockHash) + Send + Sync>;

/// Set of blocks known to be confirmed that a dedicated thread walks into
/// the ledger as cemented, dependencies first.
pub struct ConfirmingSet {
    config: ConfirmingSetConfig,
    ledger: Arc<Ledger>,
    stats: Arc<Stats>,
    mutex: Mutex<ConfirmingSetState>,
    condition: Condvar,
    thread: Mutex<Option<JoinHandle<()>>>,
    cemented_observers: Mutex<Vec<CementedCallback>>,
    already_cemented_observers: Mutex<Vec<AlreadyCementedCallback>>,
}

impl ConfirmingSet {
    pub fn new(config: ConfirmingSetConfig, ledger: Arc<Ledger>, stats: Arc<Stats>) -> Self {
        Self {
            config,
            ledger,
            stats,
            mutex: Mutex::new(ConfirmingSetState {
                set: VecDeque::new(),
                set_hashes: HashSet::new(),
                current: HashSet::new(),
                stopped: false,
            }),
            condition: Condvar::new(),
            thread: Mutex::new(None),
            cemented_observers: Mutex::new(Vec::new()),
            already_cemented_observers: Mutex::new(Vec::new()),
        }
    }

    pub fn on_cemented(&self, callback: CementedCallback) {
        self.cemented_observers.lock().unwrap().push(callback);
    }

    pub fn on_already_cemented(&self, callback: AlreadyCementedCallback) {
        self.already_cemented_observers
            .lock()
            .unwrap()
            .push(callback);
    }

    /// Adds a block to the set of blocks to be durably confirmed
    pub fn add(&self, hash: BlockHash) {
        self.add_with_election(hash, None)
    }

    pub fn add_with_election(&self, hash: BlockHash, election: Option<Arc<Election>>) {
        let added = {
            let mut guard = self.mutex.lock().unwrap();
            if guard.set_hashes.contains(&hash) {
                false
            } else {
                guard.set_hashes.insert(hash);
                guard.set.push_back(Entry { hash, election });
                true
            }
        };

        if added {
            self.condition.notify_all();
            self.stats.inc(StatType::ConfirmingSet, DetailType::Insert);
        } else {
            self.stats
                .inc(StatType::ConfirmingSet, DetailType::Duplicate);
        }
    }

    /// True while the hash is queued or being cemented
    pub fn contains(&self, hash: &BlockHash) -> bool {
        let guard = self.mutex.lock().unwrap();
        guard.set_hashes.contains(hash) || guard.current.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.mutex.lock().unwrap().set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn run(&self) {
        let mut guard = self.mutex.lock().unwrap();
        while !guard.stopped {
            if !guard.set.is_empty() {
                let mut batch = VecDeque::new();
                while batch.len() < self.config.batch_size {
                    let Some(entry) = guard.set.pop_front() else {
                        break;
                    };
                    guard.set_hashes.remove(&entry.hash);
                    guard.current.insert(entry.hash);
                    batch.push_back(entry);
                }
                drop(guard);

                self.run_batch(batch);

                guard = self.mutex.lock().unwrap();
                guard.current.clear();
            } else {
                guard = self
                    .condition
                    .wait_while(guard, |state| state.set.is_empty() && !state.stopped)
                    .unwrap();
            }
        }
    }

    fn run_batch(&self, batch: VecDeque<Entry>) {
        let mut cemented: VecDeque<CementedNotification> = VecDeque::new();
        let mut already_cemented: Vec<BlockHash> = Vec::new();

        {
            let _write_guard = self.ledger.write_queue.wait(Writer::ConfirmationHeight);
            let mut txn = self.ledger.rw_txn();

            for entry in batch {
                let hash = entry.hash;
                self.stats.inc(StatType::ConfirmingSet, DetailType::Cementing);

                // The block might have been rolled back before cementing
                if !self.ledger.any().block_exists(&txn, &hash) {
                    self.stats
                        .inc(StatType::ConfirmingSet, DetailType::MissingBlock);
                    continue;
                }

                let added = self.ledger.confirm_max(&mut txn, hash, self.config.max_blocks);
                if added.is_empty() {
                    self.stats
                        .inc(StatType::ConfirmingSet, DetailType::AlreadyCemented);
                    already_cemented.push(hash);
                } else {
                    self.stats.add(
                        StatType::ConfirmingSet,
                        DetailType::Cemented,
                        added.len() as u64,
                    );
                    self.stats
                        .inc(StatType::ConfirmingSet, DetailType::CementedHash);
                    debug!("Cemented block: {} (total cemented: {})", hash, added.len());
                    for block in added {
                        cemented.push_back(CementedNotification {
                            block,
                            confirmation_root: hash,
                            election: entry.election.clone(),
                        });
                    }
                }
            }
        }

        // Notify after the write lock is released
        {
            let observers = self.cemented_observers.lock().unwrap();
            for notification in &cemented {
                for observer in observers.iter() {
                    observer(notification);
                }
            }
        }
        {
            let observers = self.already_cemented_observers.lock().unwrap();
            for hash in already_cemented {
                for observer in observers.iter() {
                    observer(hash);
                }
            }
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

pub trait ConfirmingSetExt {
    fn start(&self);
}

impl ConfirmingSetExt for Arc<ConfirmingSet> {
    fn start(&self) {
        let mut guard = self.thread.lock().unwrap();
        debug_assert!(guard.is_none());
        let self_clone = Arc::clone(self);
        *guard = Some(
            std::thread::Builder::new()
                .name("Conf height".to_string())
                .spawn(move || self_clone.run())
                .unwrap(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use vanta_ledger::LedgerContext;

    #[test]
    fn add_contains() {
        let ctx = LedgerContext::empty();
        let confirming_set = ConfirmingSet::new(
            Default::default(),
            Arc::clone(&ctx.ledger),
            Arc::new(Stats::new()),
        );
        let hash = BlockHash::from(1);
        confirming_set.add(hash);
        assert!(confirming_set.contains(&hash));
        assert_eq!(confirming_set.len(), 1);
    }

    #[test]
    fn duplicate_insert_is_counted() {
        let ctx = LedgerContext::empty();
        let stats = Arc::new(Stats::new());
        let confirming_set = ConfirmingSet::new(
            Default::default(),
            Arc::clone(&ctx.ledger),
            Arc::clone(&stats),
        );
        confirming_set.add(BlockHash::from(1));
        confirming_set.add(BlockHash::from(1));
        assert_eq!(
            stats.count(
                StatType::ConfirmingSet,
                DetailType::Duplicate,
                crate::stats::Direction::In
            ),
            1
        );
    }

    #[test]
    fn cements_queued_block() {
        let ctx = LedgerContext::empty();
        let send = {
            let mut txn = ctx.ledger.rw_txn();
            let send = crate::test_helpers::genesis_send(
                &ctx.ledger,
                &txn,
                vanta_core::PrivateKey::new().account(),
                vanta_core::Amount::vanta(1),
            );
            ctx.ledger.process(&mut txn, &send).unwrap();
            send
        };

        let confirming_set = Arc::new(ConfirmingSet::new(
            Default::default(),
            Arc::clone(&ctx.ledger),
            Arc::new(Stats::new()),
        ));
        let cemented = Arc::new(Mutex::new(Vec::new()));
        let cemented_clone = Arc::clone(&cemented);
        confirming_set.on_cemented(Box::new(move |notification| {
            cemented_clone
                .lock()
                .unwrap()
                .push(notification.block.hash());
        }));
        confirming_set.start();

        confirming_set.add(send.hash());

        let start = Instant::now();
        while cemented.lock().unwrap().is_empty() && start.elapsed() < Duration::from_secs(5) {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(*cemented.lock().unwrap(), vec![send.hash()]);
        assert_eq!(ctx.ledger.cemented_count(), 2);
        confirming_set.stop();
    }
}

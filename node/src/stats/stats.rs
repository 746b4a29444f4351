use std::{
    collections::BTreeMap,
    sync::{atomic::{AtomicU64, Ordering}, RwLock},
};
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum StatType {
    Active,
    ActiveStarted,
    ActiveConfirmed,
    ActiveDropped,
    ActiveTimeout,
    Aggregator,
    BlockProcessor,
    ConfirmingSet,
    Election,
    ElectionVote,
    Ledger,
    OnlineReps,
    Requests,
    Vote,
    VoteCache,
    VoteGenerator,
    VoteProcessor,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum DetailType {
    All,

    // generic
    Loop,
    Insert,
    Update,
    Erase,
    Overfill,
    Duplicate,

    // ledger process results
    Progress,
    Old,
    BadSignature,
    GapPrevious,
    GapSource,
    GapEpochOpenPending,
    Fork,
    NegativeSpend,
    Unreceivable,
    OpenedBurnAccount,
    BalanceMismatch,
    RepresentativeMismatch,
    BlockPosition,
    InsufficientWork,

    // block processor
    Process,
    Forced,
    Rollback,
    RollbackFailed,

    // elections
    ElectionStart,
    ElectionRestart,
    ElectionBlockConflict,
    ElectionDifficultyUpdate,
    ElectionDropOverflow,
    ElectionHintedStart,
    GenerateVote,
    BroadcastVote,
    BroadcastBlockInitial,
    BroadcastBlockRepeat,
    ConfirmReq,
    VoteNew,
    VoteCached,
    VoteIgnored,
    VoteInvalid,
    VoteReplay,
    VoteIndeterminate,
    VoteProcessed,
    LateBlock,
    LateBlockSeconds,
    ConfirmExpiredPessimistically,

    // inactive vote cache
    BootstrapStarted,

    // confirming set
    Cementing,
    Cemented,
    CementedHash,
    AlreadyCemented,
    MissingBlock,
    ActiveQuorum,
    ActiveConfHeight,
    InactiveConfHeight,

    // request aggregator
    AggregatorAccepted,
    AggregatorDropped,
    RequestsCachedHashes,
    RequestsCachedVotes,
    RequestsGeneratedHashes,
    RequestsGeneratedVotes,
    RequestsCannotVote,
    RequestsUnknown,

    // vote generator
    GeneratorBroadcasts,
    GeneratorHashes,
    GeneratorSpacing,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Direction {
    In,
    Out,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Sample {
    ActiveElectionDuration,
    VoteGeneratorFinalHashes,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct CounterKey {
    stat_type: StatType,
    detail: DetailType,
    dir: Direction,
}

#[derive(Default)]
struct SampleEntry {
    values: Vec<i64>,
}

/// Concurrent counter and sample collector. Counters are created on first
/// use; reads see a consistent snapshot per counter.
pub struct Stats {
    counters: RwLock<BTreeMap<CounterKey, AtomicU64>>,
    samples: RwLock<BTreeMap<Sample, SampleEntry>>,
    enable_logging: bool,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(BTreeMap::new()),
            samples: RwLock::new(BTreeMap::new()),
            enable_logging: std::env::var("VANTA_LOG_STATS").is_ok(),
        }
    }

    pub fn inc(&self, stat_type: StatType, detail: DetailType) {
        self.add_dir(stat_type, detail, Direction::In, 1)
    }

    pub fn inc_dir(&self, stat_type: StatType, detail: DetailType, dir: Direction) {
        self.add_dir(stat_type, detail, dir, 1)
    }

    pub fn add(&self, stat_type: StatType, detail: DetailType, value: u64) {
        self.add_dir(stat_type, detail, Direction::In, value)
    }

    pub fn add_dir(&self, stat_type: StatType, detail: DetailType, dir: Direction, value: u64) {
        if value == 0 {
            return;
        }

        if self.enable_logging {
            debug!("Stat: {:?}::{:?}::{:?} += {}", stat_type, detail, dir, value);
        }

        let key = CounterKey {
            stat_type,
            detail,
            dir,
        };

        // Two-step to avoid exclusively locking in the common case
        {
            let lock = self.counters.read().unwrap();
            if let Some(counter) = lock.get(&key) {
                counter.fetch_add(value, Ordering::Relaxed);
                return;
            }
        }
        {
            let mut lock = self.counters.write().unwrap();
            lock.entry(key)
                .or_insert_with(|| AtomicU64::new(0))
                .fetch_add(value, Ordering::Relaxed);
        }
    }

    pub fn count(&self, stat_type: StatType, detail: DetailType, dir: Direction) -> u64 {
        let key = CounterKey {
            stat_type,
            detail,
            dir,
        };
        self.counters
            .read()
            .unwrap()
            .get(&key)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn sample(&self, sample: Sample, value: i64) {
        let mut lock = self.samples.write().unwrap();
        let entry = lock.entry(sample).or_default();
        // Keep a bounded window of observations
        if entry.values.len() >= 16384 {
            entry.values.remove(0);
        }
        entry.values.push(value);
    }

    pub fn samples(&self, sample: Sample) -> Vec<i64> {
        self.samples
            .read()
            .unwrap()
            .get(&sample)
            .map(|entry| entry.values.clone())
            .unwrap_or_default()
    }
}

use super::{ActiveTransactions, ActiveTransactionsExt, VoteProcessorQueue};
use crate::{
    stats::{DetailType, StatType, Stats},
    transport::ChannelId,
};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    thread::JoinHandle,
};
use tracing::trace;
use vanta_core::{Vote, VoteCode, VoteSource};

pub type VoteProcessedCallback =
    Box<dyn Fn(&Arc<Vote>, ChannelId, VoteSource, VoteCode) + Send + Sync>;

/// Verifies vote signatures in batches and dispatches the results serially
/// into the elections and the inactive vote cache.
pub struct VoteProcessor {
    queue: Arc<VoteProcessorQueue>,
    active: Arc<ActiveTransactions>,
    stats: Arc<Stats>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    vote_processed: Mutex<Vec<VoteProcessedCallback>>,
    pub total_processed: AtomicU64,
}

impl VoteProcessor {
    pub fn new(
        queue: Arc<VoteProcessorQueue>,
        active: Arc<ActiveTransactions>,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            queue,
            active,
            stats,
            threads: Mutex::new(Vec::new()),
            vote_processed: Mutex::new(Vec::new()),
            total_processed: AtomicU64::new(0),
        }
    }

    pub fn add_vote_processed_callback(&self, callback: VoteProcessedCallback) {
        self.vote_processed.lock().unwrap().push(callback);
    }

    fn run(&self) {
        loop {
            self.stats.inc(StatType::VoteProcessor, DetailType::Loop);

            let batch = self.queue.wait_for_votes(self.queue.config.batch_size);
            if batch.is_empty() {
                break; // stopped
            }

            for (vote, channel_id, source) in &batch {
                self.vote_blocking(vote, *channel_id, *source);
            }

            self.total_processed
                .fetch_add(batch.len() as u64, Ordering::SeqCst);
        }
    }

    /// Verifies and applies a single vote, returning the aggregate outcome
    /// over all hashes the vote names
    pub fn vote_blocking(
        &self,
        vote: &Arc<Vote>,
        channel_id: ChannelId,
        source: VoteSource,
    ) -> VoteCode {
        let mut result = VoteCode::Invalid;
        if vote.validate().is_ok() {
            let vote_results = self.active.vote(vote, source);

            // Aggregate results for individual hashes
            let mut replay = false;
            let mut processed = false;
            for hash_result in vote_results.values() {
                replay |= *hash_result == VoteCode::Replay;
                processed |= *hash_result == VoteCode::Vote;
            }
            result = if replay {
                VoteCode::Replay
            } else if processed {
                VoteCode::Vote
            } else {
                VoteCode::Indeterminate
            };

            let callbacks = self.vote_processed.lock().unwrap();
            for callback in callbacks.iter() {
                callback(vote, channel_id, source, result);
            }
        } else {
            self.stats.inc(StatType::Vote, DetailType::VoteInvalid);
        }

        self.stats.inc(StatType::Vote, DetailType::VoteProcessed);
        trace!(account = %vote.voting_account, ?result, ?source, "vote processed");

        result
    }

    pub fn stop(&self) {
        self.queue.stop();

        let mut handles = Vec::new();
        {
            let mut guard = self.threads.lock().unwrap();
            std::mem::swap(&mut handles, &mut guard);
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}

pub trait VoteProcessorExt {
    fn start(&self);
}

impl VoteProcessorExt for Arc<VoteProcessor> {
    fn start(&self) {
        let mut threads = self.threads.lock().unwrap();
        debug_assert!(threads.is_empty());
        for _ in 0..self.queue.config.threads {
            let self_clone = Arc::clone(self);
            threads.push(
                std::thread::Builder::new()
                    .name("Vote processing".to_string())
                    .spawn(move || self_clone.run())
                    .unwrap(),
            );
        }
    }
}

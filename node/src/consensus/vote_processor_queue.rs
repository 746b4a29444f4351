use crate::{
    stats::{DetailType, StatType, Stats},
    transport::ChannelId,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Condvar, Mutex},
};
use vanta_core::{Vote, VoteSource};

#[derive(Clone, Debug, PartialEq)]
pub struct VoteProcessorConfig {
    pub max_queue: usize,
    pub batch_size: usize,
    pub threads: usize,
}

impl Default for VoteProcessorConfig {
    fn default() -> Self {
        Self {
            max_queue: 2048,
            batch_size: 1024,
            threads: 1,
        }
    }
}

pub type QueueEntry = (Arc<Vote>, ChannelId, VoteSource);

struct QueueState {
    queue: VecDeque<QueueEntry>,
    stopped: bool,
}

/// Bounded queue feeding the vote processing workers; overflow drops and
/// counts
pub struct VoteProcessorQueue {
    pub config: VoteProcessorConfig,
    state: Mutex<QueueState>,
    condition: Condvar,
    stats: Arc<Stats>,
}

impl VoteProcessorQueue {
    pub fn new(config: VoteProcessorConfig, stats: Arc<Stats>) -> Self {
        Self {
            config,
            state: Mutex::new(QueueState {
                queue: VecDeque::new(),
                stopped: false,
            }),
            condition: Condvar::new(),
            stats,
        }
    }

    pub fn vote(&self, vote: Arc<Vote>, channel_id: ChannelId, source: VoteSource) -> bool {
        let added = {
            let mut guard = self.state.lock().unwrap();
            if guard.queue.len() >= self.config.max_queue {
                false
            } else {
                guard.queue.push_back((vote, channel_id, source));
                true
            }
        };

        if added {
            self.condition.notify_all();
        } else {
            self.stats.inc(StatType::VoteProcessor, DetailType::Overfill);
        }
        added
    }

    /// Blocks until votes are available or the queue is stopped; an empty
    /// result means stopped
    pub fn wait_for_votes(&self, max_count: usize) -> Vec<QueueEntry> {
        let mut guard = self.state.lock().unwrap();
        guard = self
            .condition
            .wait_while(guard, |state| state.queue.is_empty() && !state.stopped)
            .unwrap();

        if guard.stopped {
            return Vec::new();
        }

        let take = std::cmp::min(max_count, guard.queue.len());
        guard.queue.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stop(&self) {
        self.state.lock().unwrap().stopped = true;
        self.condition.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanta_core::PrivateKey;

    #[test]
    fn overflow_is_dropped_and_counted() {
        let stats = Arc::new(Stats::new());
        let queue = VoteProcessorQueue::new(
            VoteProcessorConfig {
                max_queue: 1,
                ..Default::default()
            },
            Arc::clone(&stats),
        );
        let vote = Arc::new(Vote::new(&PrivateKey::from(1), 1, vec![1u64.into()]));

        assert!(queue.vote(Arc::clone(&vote), ChannelId::from(1), VoteSource::Live));
        assert!(!queue.vote(vote, ChannelId::from(1), VoteSource::Live));
        assert_eq!(
            stats.count(
                StatType::VoteProcessor,
                DetailType::Overfill,
                crate::stats::Direction::In
            ),
            1
        );
    }

    #[test]
    fn wait_returns_queued_votes() {
        let queue = VoteProcessorQueue::new(Default::default(), Arc::new(Stats::new()));
        let vote = Arc::new(Vote::new(&PrivateKey::from(1), 1, vec![1u64.into()]));
        queue.vote(vote, ChannelId::from(7), VoteSource::Live);

        let batch = queue.wait_for_votes(16);
        assert_eq!(batch.len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn stopped_queue_returns_empty_batch() {
        let queue = VoteProcessorQueue::new(Default::default(), Arc::new(Stats::new()));
        queue.stop();
        assert!(queue.wait_for_votes(16).is_empty());
    }
}

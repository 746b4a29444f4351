use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};
use vanta_core::{BlockHash, Root, Vote};

/// Votes this node generated, kept so repeated confirmation requests can be
/// answered without generating again. One vote per representative per hash;
/// a newer vote replaces the older one.
pub struct LocalVoteHistory {
    data: Mutex<HistoryData>,
    max_size: usize,
}

#[derive(Default)]
struct HistoryData {
    by_hash: HashMap<BlockHash, Vec<Arc<Vote>>>,
    by_root: HashMap<Root, Vec<BlockHash>>,
    sequence: VecDeque<BlockHash>,
}

impl LocalVoteHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            data: Mutex::new(Default::default()),
            max_size,
        }
    }

    pub fn add(&self, root: &Root, hash: &BlockHash, vote: &Arc<Vote>) {
        let mut guard = self.data.lock().unwrap();
        match guard.by_hash.get_mut(hash) {
            Some(votes) => {
                // Replace an older vote from the same representative
                if let Some(existing) = votes
                    .iter_mut()
                    .find(|existing| existing.voting_account == vote.voting_account)
                {
                    if vote.timestamp > existing.timestamp {
                        *existing = Arc::clone(vote);
                    }
                } else {
                    votes.push(Arc::clone(vote));
                }
            }
            None => {
                // Evict the oldest hash when full
                if guard.sequence.len() >= self.max_size {
                    if let Some(oldest) = guard.sequence.pop_front() {
                        guard.by_hash.remove(&oldest);
                    }
                }
                guard.by_hash.insert(*hash, vec![Arc::clone(vote)]);
                guard.sequence.push_back(*hash);
                guard.by_root.entry(*root).or_default().push(*hash);
            }
        }
    }

    /// Votes previously generated for this hash
    pub fn votes(&self, hash: &BlockHash) -> Vec<Arc<Vote>> {
        self.data
            .lock()
            .unwrap()
            .by_hash
            .get(hash)
            .cloned()
            .unwrap_or_default()
    }

    /// Removes all generated votes for a root, used when an election's
    /// winner changes and the old votes must not be served any more
    pub fn erase(&self, root: &Root) {
        let mut guard = self.data.lock().unwrap();
        if let Some(hashes) = guard.by_root.remove(root) {
            for hash in hashes {
                guard.by_hash.remove(&hash);
                guard.sequence.retain(|h| *h != hash);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap().by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
    time::{Duration, Instant},
};
use vanta_core::{BlockHash, QualifiedRoot};

/// Bounded ring of recently confirmed chain slots, used to reject replayed
/// votes and to prevent restarting a just-confirmed election.
pub struct RecentlyConfirmedCache {
    data: Mutex<RecentlyConfirmedData>,
    max_len: usize,
}

#[derive(Default)]
struct RecentlyConfirmedData {
    sequence: VecDeque<(QualifiedRoot, BlockHash)>,
    by_root: HashSet<QualifiedRoot>,
    by_hash: HashSet<BlockHash>,
}

impl RecentlyConfirmedCache {
    pub fn new(max_len: usize) -> Self {
        Self {
            data: Mutex::new(Default::default()),
            max_len,
        }
    }

    pub fn put(&self, root: QualifiedRoot, hash: BlockHash) {
        let mut guard = self.data.lock().unwrap();
        if guard.by_root.contains(&root) {
            return;
        }
        guard.by_root.insert(root.clone());
        guard.by_hash.insert(hash);
        guard.sequence.push_back((root, hash));
        if guard.sequence.len() > self.max_len {
            if let Some((old_root, old_hash)) = guard.sequence.pop_front() {
                guard.by_root.remove(&old_root);
                guard.by_hash.remove(&old_hash);
            }
        }
    }

    pub fn root_exists(&self, root: &QualifiedRoot) -> bool {
        self.data.lock().unwrap().by_root.contains(root)
    }

    pub fn hash_exists(&self, hash: &BlockHash) -> bool {
        self.data.lock().unwrap().by_hash.contains(hash)
    }

    pub fn back(&self) -> Option<(QualifiedRoot, BlockHash)> {
        self.data.lock().unwrap().sequence.back().cloned()
    }

    pub fn erase(&self, hash: &BlockHash) {
        let mut guard = self.data.lock().unwrap();
        if guard.by_hash.remove(hash) {
            if let Some(position) = guard.sequence.iter().position(|(_, h)| h == hash) {
                let (root, _) = guard.sequence.remove(position).unwrap();
                guard.by_root.remove(&root);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap().sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut guard = self.data.lock().unwrap();
        guard.sequence.clear();
        guard.by_root.clear();
        guard.by_hash.clear();
    }
}

/// Roots of elections that were dropped without confirmation, kept for a
/// bounded time so a higher work version can restart them.
pub struct RecentlyDroppedCache {
    data: Mutex<HashMap<QualifiedRoot, Instant>>,
    retention: Duration,
    max_len: usize,
}

impl RecentlyDroppedCache {
    pub const DEFAULT_RETENTION: Duration = Duration::from_secs(10 * 60);

    pub fn new(max_len: usize, retention: Duration) -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            retention,
            max_len,
        }
    }

    pub fn add(&self, root: QualifiedRoot) {
        let mut guard = self.data.lock().unwrap();
        let retention = self.retention;
        guard.retain(|_, dropped| dropped.elapsed() < retention);
        if guard.len() >= self.max_len {
            // Evict the stalest entry
            if let Some(oldest) = guard
                .iter()
                .min_by_key(|(_, dropped)| **dropped)
                .map(|(root, _)| root.clone())
            {
                guard.remove(&oldest);
            }
        }
        guard.insert(root, Instant::now());
    }

    pub fn find(&self, root: &QualifiedRoot) -> Option<Instant> {
        let guard = self.data.lock().unwrap();
        guard
            .get(root)
            .filter(|dropped| dropped.elapsed() < self.retention)
            .copied()
    }

    pub fn erase(&self, root: &QualifiedRoot) {
        self.data.lock().unwrap().remove(root);
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }
}

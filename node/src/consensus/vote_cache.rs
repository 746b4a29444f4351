use crate::stats::{DetailType, StatType, Stats};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::{Duration, Instant},
};
use vanta_core::{Amount, BlockHash, PublicKey};

#[derive(Clone, Debug, PartialEq)]
pub struct VoteCacheConfig {
    pub max_size: usize,
    pub max_voters: usize,
    /// Distinct voters required before an election is started for the hash
    pub election_start_voters_min: usize,
    /// Cache age above which an election start counts as a late block
    pub late_blocks_delay: Duration,
}

impl Default for VoteCacheConfig {
    fn default() -> Self {
        Self {
            max_size: 16 * 1024,
            max_voters: 40,
            election_start_voters_min: 5,
            late_blocks_delay: Duration::from_secs(5),
        }
    }
}

/// Progress flags of a cached hash, once set they stay set
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct InactiveCacheStatus {
    /// A lazy bootstrap for the missing block was requested
    pub bootstrap_started: bool,
    /// An election was started, or will start once the block arrives
    pub election_started: bool,
    /// The cached voters alone reach quorum
    pub confirmed: bool,
}

/// Votes buffered for a single block hash that has no live election,
/// usually because the block itself has not arrived yet
#[derive(Clone)]
pub struct CacheEntry {
    id: usize,
    pub hash: BlockHash,
    pub voters: Vec<(PublicKey, u64)>,
    pub arrival: Instant,
    pub status: InactiveCacheStatus,
}

impl CacheEntry {
    fn new(id: usize, hash: BlockHash) -> Self {
        Self {
            id,
            hash,
            voters: Vec::new(),
            arrival: Instant::now(),
            status: InactiveCacheStatus::default(),
        }
    }

    /// Records a vote, returns true for a previously unseen representative
    fn vote(&mut self, representative: &PublicKey, timestamp: u64, max_voters: usize) -> bool {
        if let Some(existing) = self
            .voters
            .iter_mut()
            .find(|(voter, _)| voter == representative)
        {
            if timestamp > existing.1 {
                existing.1 = timestamp;
            }
            return false;
        }
        if self.voters.len() < max_voters {
            self.voters.push((*representative, timestamp));
            return true;
        }
        false
    }

    pub fn tally(&self, weight_of: impl Fn(&PublicKey) -> Amount) -> Amount {
        self.voters
            .iter()
            .map(|(voter, _)| weight_of(voter))
            .sum()
    }
}

/// Newly fired triggers resulting from a cached vote
#[derive(Default, Debug, PartialEq, Eq)]
pub struct CacheTriggers {
    pub start_bootstrap: bool,
    pub start_election: bool,
    pub newly_confirmed: bool,
}

/// A bounded container of votes that arrived before their block. The oldest
/// entries are evicted first.
pub struct VoteCache {
    config: VoteCacheConfig,
    sequential: BTreeMap<usize, BlockHash>,
    by_hash: HashMap<BlockHash, CacheEntry>,
    next_id: usize,
    stats: Arc<Stats>,
}

impl VoteCache {
    pub fn new(config: VoteCacheConfig, stats: Arc<Stats>) -> Self {
        Self {
            config,
            sequential: BTreeMap::new(),
            by_hash: HashMap::new(),
            next_id: 0,
            stats,
        }
    }

    /// Adds a vote for `hash` and evaluates the bootstrap, election start
    /// and confirmation triggers. `delta` is the current confirmation
    /// quorum; `weight_of` resolves representative weights.
    pub fn vote(
        &mut self,
        hash: &BlockHash,
        representative: &PublicKey,
        timestamp: u64,
        delta: Amount,
        weight_of: impl Fn(&PublicKey) -> Amount,
    ) -> (CacheEntry, CacheTriggers) {
        let max_voters = self.config.max_voters;
        if self.by_hash.contains_key(hash) {
            self.stats.inc(StatType::VoteCache, DetailType::Update);
        } else {
            self.stats.inc(StatType::VoteCache, DetailType::Insert);
            let id = self.next_id;
            self.next_id += 1;
            self.sequential.insert(id, *hash);
            self.by_hash.insert(*hash, CacheEntry::new(id, *hash));
        }
        let entry = self.by_hash.get_mut(hash).unwrap();
        entry.vote(representative, timestamp, max_voters);

        let tally = entry.tally(&weight_of);
        let mut triggers = CacheTriggers::default();

        if tally >= delta && !entry.status.bootstrap_started {
            entry.status.bootstrap_started = true;
            triggers.start_bootstrap = true;
        }
        if entry.voters.len() >= self.config.election_start_voters_min
            && !entry.status.election_started
        {
            entry.status.election_started = true;
            triggers.start_election = true;
        }
        if tally >= delta && !entry.status.confirmed {
            entry.status.confirmed = true;
            triggers.newly_confirmed = true;
        }

        let snapshot = entry.clone();
        self.trim();
        (snapshot, triggers)
    }

    fn trim(&mut self) {
        while self.by_hash.len() > self.config.max_size {
            if let Some((_, hash)) = self.sequential.pop_first() {
                self.by_hash.remove(&hash);
            }
        }
    }

    pub fn find(&self, hash: &BlockHash) -> Option<CacheEntry> {
        self.by_hash.get(hash).cloned()
    }

    pub fn erase(&mut self, hash: &BlockHash) -> bool {
        match self.by_hash.remove(hash) {
            Some(entry) => {
                self.sequential.remove(&entry.id);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub fn config(&self) -> &VoteCacheConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache(max_size: usize) -> VoteCache {
        VoteCache::new(
            VoteCacheConfig {
                max_size,
                ..Default::default()
            },
            Arc::new(Stats::new()),
        )
    }

    fn flat_weight(_: &PublicKey) -> Amount {
        Amount::raw(1)
    }

    #[test]
    fn first_vote_creates_entry() {
        let mut cache = test_cache(8);
        let hash = BlockHash::from(1);
        let (entry, _) = cache.vote(&hash, &PublicKey::from(1), 1, Amount::MAX, flat_weight);

        assert_eq!(cache.len(), 1);
        assert_eq!(entry.voters.len(), 1);
        assert!(!entry.status.bootstrap_started);
    }

    #[test]
    fn duplicate_voter_does_not_grow_entry() {
        let mut cache = test_cache(8);
        let hash = BlockHash::from(1);
        let rep = PublicKey::from(1);
        cache.vote(&hash, &rep, 1, Amount::MAX, flat_weight);
        let (entry, _) = cache.vote(&hash, &rep, 2, Amount::MAX, flat_weight);

        assert_eq!(entry.voters.len(), 1);
        // The newer timestamp replaced the older one
        assert_eq!(entry.voters[0].1, 2);
    }

    #[test]
    fn quorum_triggers_bootstrap_and_confirmed_once() {
        let mut cache = test_cache(8);
        let hash = BlockHash::from(1);

        let (_, triggers) = cache.vote(&hash, &PublicKey::from(1), 1, Amount::raw(1), flat_weight);
        assert!(triggers.start_bootstrap);
        assert!(triggers.newly_confirmed);

        let (entry, triggers) =
            cache.vote(&hash, &PublicKey::from(2), 1, Amount::raw(1), flat_weight);
        assert!(!triggers.start_bootstrap);
        assert!(!triggers.newly_confirmed);
        assert!(entry.status.bootstrap_started);
        assert!(entry.status.confirmed);
    }

    #[test]
    fn election_starts_at_voter_threshold() {
        let mut cache = test_cache(8);
        let hash = BlockHash::from(1);

        for i in 0..4 {
            let (_, triggers) =
                cache.vote(&hash, &PublicKey::from(i), 1, Amount::MAX, flat_weight);
            assert!(!triggers.start_election);
        }

        let (entry, triggers) = cache.vote(&hash, &PublicKey::from(4), 1, Amount::MAX, flat_weight);
        assert!(triggers.start_election);
        assert!(entry.status.election_started);

        // The threshold fires only once
        let (_, triggers) = cache.vote(&hash, &PublicKey::from(5), 1, Amount::MAX, flat_weight);
        assert!(!triggers.start_election);
    }

    #[test]
    fn oldest_entries_are_evicted_first() {
        let mut cache = test_cache(2);
        cache.vote(&BlockHash::from(1), &PublicKey::from(1), 1, Amount::MAX, flat_weight);
        cache.vote(&BlockHash::from(2), &PublicKey::from(2), 1, Amount::MAX, flat_weight);
        cache.vote(&BlockHash::from(3), &PublicKey::from(3), 1, Amount::MAX, flat_weight);

        assert_eq!(cache.len(), 2);
        assert!(cache.find(&BlockHash::from(1)).is_none());
        assert!(cache.find(&BlockHash::from(3)).is_some());
    }

    #[test]
    fn erase_removes_entry() {
        let mut cache = test_cache(8);
        let hash = BlockHash::from(1);
        cache.vote(&hash, &PublicKey::from(1), 1, Amount::MAX, flat_weight);
        assert!(cache.erase(&hash));
        assert!(!cache.erase(&hash));
        assert!(cache.is_empty());
    }
}

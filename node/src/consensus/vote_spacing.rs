use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use vanta_core::{BlockHash, Root};

/// Prevents the local representatives from flapping between forks: after
/// voting for one block in a slot, votes for a different block of the same
/// slot are suppressed for the spacing interval.
pub struct VoteSpacing {
    delay: Duration,
    recent: HashMap<Root, (BlockHash, Instant)>,
}

impl VoteSpacing {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            recent: HashMap::new(),
        }
    }

    pub fn votable(&self, root: &Root, hash: &BlockHash) -> bool {
        match self.recent.get(root) {
            Some((voted_hash, time)) => voted_hash == hash || time.elapsed() >= self.delay,
            None => true,
        }
    }

    pub fn flag(&mut self, root: &Root, hash: &BlockHash) {
        self.trim();
        self.recent.insert(*root, (*hash, Instant::now()));
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    fn trim(&mut self) {
        let delay = self.delay;
        self.recent.retain(|_, (_, time)| time.elapsed() < delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_hash_is_always_votable() {
        let mut spacing = VoteSpacing::new(Duration::from_secs(1));
        let root = Root::from(1);
        let hash = BlockHash::from(2);
        spacing.flag(&root, &hash);
        assert!(spacing.votable(&root, &hash));
    }

    #[test]
    fn different_hash_is_suppressed_within_delay() {
        let mut spacing = VoteSpacing::new(Duration::from_secs(60));
        let root = Root::from(1);
        spacing.flag(&root, &BlockHash::from(2));
        assert!(!spacing.votable(&root, &BlockHash::from(3)));
    }

    #[test]
    fn different_root_is_unaffected() {
        let mut spacing = VoteSpacing::new(Duration::from_secs(60));
        spacing.flag(&Root::from(1), &BlockHash::from(2));
        assert!(spacing.votable(&Root::from(9), &BlockHash::from(3)));
    }
}

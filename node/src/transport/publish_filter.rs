use std::{collections::HashSet, sync::Mutex};
use vanta_core::{Block, BlockHash};

/// Duplicate suppression for incoming publishes. Keyed by the full content
/// digest, so a republish of the same slot content with higher work is seen
/// as new.
#[derive(Default)]
pub struct PublishFilter {
    digests: Mutex<HashSet<BlockHash>>,
}

impl PublishFilter {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records the block and returns true if it was recently seen
    pub fn apply(&self, block: &Block) -> bool {
        !self.digests.lock().unwrap().insert(block.full_hash())
    }

    /// Forgets a block so it can be seen again
    pub fn clear(&self, block: &Block) {
        self.digests.lock().unwrap().remove(&block.full_hash());
    }

    pub fn len(&self) -> usize {
        self.digests.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanta_core::{Amount, Block, BlockHash, Link, PrivateKey, StateBlock};

    fn test_block(work: u64) -> Block {
        let key = PrivateKey::from(1);
        Block::State(StateBlock::new(
            key.account(),
            BlockHash::from(2),
            key.public_key(),
            Amount::raw(3),
            Link::from(4),
            &key,
            work,
        ))
    }

    #[test]
    fn detects_duplicates() {
        let filter = PublishFilter::new();
        let block = test_block(1);
        assert!(!filter.apply(&block));
        assert!(filter.apply(&block));
    }

    #[test]
    fn higher_work_version_is_new() {
        let filter = PublishFilter::new();
        assert!(!filter.apply(&test_block(1)));
        assert!(!filter.apply(&test_block(2)));
    }

    #[test]
    fn clear_allows_block_again() {
        let filter = PublishFilter::new();
        let block = test_block(1);
        filter.apply(&block);
        filter.clear(&block);
        assert!(!filter.apply(&block));
    }
}

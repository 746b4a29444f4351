use crate::stats::{DetailType, StatType, Stats};
use std::sync::Arc;
use vanta_core::{Block, BlockHash, UncheckedInfo, UncheckedKey};
use vanta_ledger::Ledger;

/// Blocks that arrived before a dependency, parked until it shows up
pub struct UncheckedMap {
    ledger: Arc<Ledger>,
    stats: Arc<Stats>,
    max_entries: u64,
}

impl UncheckedMap {
    pub fn new(ledger: Arc<Ledger>, stats: Arc<Stats>, max_entries: u64) -> Self {
        Self {
            ledger,
            stats,
            max_entries,
        }
    }

    pub fn put(&self, dependency: BlockHash, block: &Block) {
        let mut txn = self.ledger.rw_txn();
        if self.ledger.store.unchecked.count(&txn) >= self.max_entries {
            self.stats.inc(StatType::BlockProcessor, DetailType::Overfill);
            return;
        }
        let key = UncheckedKey::new(dependency, block.hash());
        self.ledger
            .store
            .unchecked
            .put(&mut txn, &key, &UncheckedInfo::new(block.clone()));
        self.stats.inc(StatType::BlockProcessor, DetailType::Insert);
    }

    /// Removes and returns everything that was waiting on `dependency`
    pub fn trigger(&self, dependency: &BlockHash) -> Vec<Block> {
        let mut txn = self.ledger.rw_txn();
        let entries = self.ledger.store.unchecked.get_dependents(&txn, dependency);
        let mut result = Vec::with_capacity(entries.len());
        for (key, info) in entries {
            self.ledger.store.unchecked.del(&mut txn, &key);
            result.push(info.block);
        }
        result
    }

    pub fn len(&self) -> u64 {
        let txn = self.ledger.read_txn();
        self.ledger.store.unchecked.count(&txn)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanta_core::{Amount, Link, PrivateKey, StateBlock};
    use vanta_ledger::LedgerContext;

    fn test_block(previous: u64) -> Block {
        let key = PrivateKey::from(1);
        Block::State(StateBlock::new(
            key.account(),
            BlockHash::from(previous),
            key.public_key(),
            Amount::raw(1),
            Link::from(2),
            &key,
            0,
        ))
    }

    #[test]
    fn put_and_trigger() {
        let ctx = LedgerContext::empty();
        let unchecked = UncheckedMap::new(Arc::clone(&ctx.ledger), Arc::new(Stats::new()), 1024);
        let dependency = BlockHash::from(7);
        let block = test_block(7);

        unchecked.put(dependency, &block);
        assert_eq!(unchecked.len(), 1);

        let triggered = unchecked.trigger(&dependency);
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].hash(), block.hash());
        assert!(unchecked.is_empty());
    }

    #[test]
    fn trigger_unrelated_dependency_returns_nothing() {
        let ctx = LedgerContext::empty();
        let unchecked = UncheckedMap::new(Arc::clone(&ctx.ledger), Arc::new(Stats::new()), 1024);
        unchecked.put(BlockHash::from(7), &test_block(7));

        assert!(unchecked.trigger(&BlockHash::from(8)).is_empty());
        assert_eq!(unchecked.len(), 1);
    }

    #[test]
    fn bounded_by_max_entries() {
        let ctx = LedgerContext::empty();
        let unchecked = UncheckedMap::new(Arc::clone(&ctx.ledger), Arc::new(Stats::new()), 1);
        unchecked.put(BlockHash::from(1), &test_block(1));
        unchecked.put(BlockHash::from(2), &test_block(2));
        assert_eq!(unchecked.len(), 1);
    }
}

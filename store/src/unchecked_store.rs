use crate::{Transaction, WriteTransaction};
use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};
use vanta_core::{BlockHash, UncheckedInfo, UncheckedKey};

/// Blocks whose dependency was unknown at processing time, keyed by
/// `(dependency_hash, block_hash)` so all children of a dependency can be
/// drained with a range scan once it arrives.
#[derive(Clone, Default)]
pub struct UncheckedStore {
    db: Arc<RwLock<BTreeMap<UncheckedKey, UncheckedInfo>>>,
}

impl UncheckedStore {
    pub fn put(&self, _tx: &mut WriteTransaction, key: &UncheckedKey, info: &UncheckedInfo) {
        self.db.write().unwrap().insert(key.clone(), info.clone());
    }

    pub fn del(&self, _tx: &mut WriteTransaction, key: &UncheckedKey) {
        self.db.write().unwrap().remove(key);
    }

    pub fn exists(&self, _tx: &dyn Transaction, key: &UncheckedKey) -> bool {
        self.db.read().unwrap().contains_key(key)
    }

    pub fn count(&self, _tx: &dyn Transaction) -> u64 {
        self.db.read().unwrap().len() as u64
    }

    /// All blocks waiting on `dependency`
    pub fn get_dependents(
        &self,
        _tx: &dyn Transaction,
        dependency: &BlockHash,
    ) -> Vec<(UncheckedKey, UncheckedInfo)> {
        let start = UncheckedKey::new(*dependency, BlockHash::zero());
        self.db
            .read()
            .unwrap()
            .range(start..)
            .take_while(|(key, _)| key.previous == *dependency)
            .map(|(key, info)| (key.clone(), info.clone()))
            .collect()
    }

    pub fn clear(&self, _tx: &mut WriteTransaction) {
        self.db.write().unwrap().clear();
    }
}

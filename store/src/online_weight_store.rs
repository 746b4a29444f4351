use crate::{Transaction, WriteTransaction};
use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};
use vanta_core::Amount;

/// Periodic samples of aggregate online representative weight, keyed by
/// sample time in nanoseconds since the unix epoch
#[derive(Clone, Default)]
pub struct OnlineWeightStore {
    db: Arc<RwLock<BTreeMap<u64, Amount>>>,
}

impl OnlineWeightStore {
    pub fn put(&self, _tx: &mut WriteTransaction, time: u64, amount: &Amount) {
        self.db.write().unwrap().insert(time, *amount);
    }

    pub fn del(&self, _tx: &mut WriteTransaction, time: u64) {
        self.db.write().unwrap().remove(&time);
    }

    pub fn count(&self, _tx: &dyn Transaction) -> u64 {
        self.db.read().unwrap().len() as u64
    }

    pub fn oldest(&self, _tx: &dyn Transaction) -> Option<u64> {
        self.db.read().unwrap().keys().next().copied()
    }

    /// Samples in chronological order
    pub fn iter(&self, _tx: &dyn Transaction) -> Vec<(u64, Amount)> {
        self.db
            .read()
            .unwrap()
            .iter()
            .map(|(time, amount)| (*time, *amount))
            .collect()
    }

    pub fn clear(&self, _tx: &mut WriteTransaction) {
        self.db.write().unwrap().clear();
    }
}

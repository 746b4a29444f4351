use crate::{Transaction, WriteTransaction};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use vanta_core::PublicKey;

/// Highest vote sequence issued per local representative, so that generated
/// votes keep superseding earlier ones across restarts
#[derive(Clone, Default)]
pub struct VoteStore {
    db: Arc<RwLock<HashMap<PublicKey, u64>>>,
}

impl VoteStore {
    pub fn get(&self, _tx: &dyn Transaction, representative: &PublicKey) -> u64 {
        self.db
            .read()
            .unwrap()
            .get(representative)
            .copied()
            .unwrap_or(0)
    }

    pub fn put(&self, _tx: &mut WriteTransaction, representative: &PublicKey, sequence: u64) {
        self.db.write().unwrap().insert(*representative, sequence);
    }
}

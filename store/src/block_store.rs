use crate::{Transaction, WriteTransaction};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use vanta_core::{BlockHash, SavedBlock};

#[derive(Clone, Default)]
pub struct BlockStore {
    db: Arc<RwLock<HashMap<BlockHash, SavedBlock>>>,
}

impl BlockStore {
    pub fn get(&self, _tx: &dyn Transaction, hash: &BlockHash) -> Option<SavedBlock> {
        self.db.read().unwrap().get(hash).cloned()
    }

    pub fn exists(&self, _tx: &dyn Transaction, hash: &BlockHash) -> bool {
        self.db.read().unwrap().contains_key(hash)
    }

    pub fn put(&self, _tx: &mut WriteTransaction, block: &SavedBlock) {
        self.db
            .write()
            .unwrap()
            .insert(block.hash(), block.clone());
    }

    pub fn del(&self, _tx: &mut WriteTransaction, hash: &BlockHash) {
        self.db.write().unwrap().remove(hash);
    }

    /// Hash of the next block in the same chain, if any
    pub fn successor(&self, _tx: &dyn Transaction, hash: &BlockHash) -> Option<BlockHash> {
        self.db
            .read()
            .unwrap()
            .get(hash)
            .and_then(|block| block.successor())
    }

    pub fn set_successor(
        &self,
        _tx: &mut WriteTransaction,
        hash: &BlockHash,
        successor: BlockHash,
    ) {
        if let Some(block) = self.db.write().unwrap().get_mut(hash) {
            block.sideband.successor = successor;
        }
    }

    pub fn count(&self, _tx: &dyn Transaction) -> u64 {
        self.db.read().unwrap().len() as u64
    }
}

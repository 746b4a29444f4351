use crate::{Transaction, WriteTransaction};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use vanta_core::{Account, BlockHash};

/// Maps a legacy chain head hash back to its owning account
#[derive(Clone, Default)]
pub struct FrontierStore {
    db: Arc<RwLock<HashMap<BlockHash, Account>>>,
}

impl FrontierStore {
    pub fn get(&self, _tx: &dyn Transaction, hash: &BlockHash) -> Option<Account> {
        self.db.read().unwrap().get(hash).copied()
    }

    pub fn put(&self, _tx: &mut WriteTransaction, hash: &BlockHash, account: &Account) {
        self.db.write().unwrap().insert(*hash, *account);
    }

    pub fn del(&self, _tx: &mut WriteTransaction, hash: &BlockHash) {
        self.db.write().unwrap().remove(hash);
    }
}

use crate::{Transaction, WriteTransaction};
use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};
use vanta_core::{Account, BlockHash, PendingInfo, PendingKey};

#[derive(Clone, Default)]
pub struct PendingStore {
    db: Arc<RwLock<BTreeMap<PendingKey, PendingInfo>>>,
}

impl PendingStore {
    pub fn get(&self, _tx: &dyn Transaction, key: &PendingKey) -> Option<PendingInfo> {
        self.db.read().unwrap().get(key).cloned()
    }

    pub fn exists(&self, tx: &dyn Transaction, key: &PendingKey) -> bool {
        self.get(tx, key).is_some()
    }

    pub fn put(&self, _tx: &mut WriteTransaction, key: &PendingKey, info: &PendingInfo) {
        self.db.write().unwrap().insert(key.clone(), info.clone());
    }

    pub fn del(&self, _tx: &mut WriteTransaction, key: &PendingKey) {
        self.db.write().unwrap().remove(key);
    }

    pub fn count(&self, _tx: &dyn Transaction) -> u64 {
        self.db.read().unwrap().len() as u64
    }

    /// Any receivable for the account, regardless of source hash
    pub fn any_for_account(&self, _tx: &dyn Transaction, account: &Account) -> bool {
        let start = PendingKey::new(*account, BlockHash::zero());
        self.db
            .read()
            .unwrap()
            .range(start..)
            .next()
            .map(|(key, _)| key.receiving_account == *account)
            .unwrap_or(false)
    }

    pub fn iter_account(
        &self,
        _tx: &dyn Transaction,
        account: &Account,
    ) -> Vec<(PendingKey, PendingInfo)> {
        let start = PendingKey::new(*account, BlockHash::zero());
        self.db
            .read()
            .unwrap()
            .range(start..)
            .take_while(|(key, _)| key.receiving_account == *account)
            .map(|(key, info)| (key.clone(), info.clone()))
            .collect()
    }
}

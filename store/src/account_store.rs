use crate::{Transaction, WriteTransaction};
use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::{Arc, RwLock},
};
use vanta_core::{Account, AccountInfo};

#[derive(Clone, Default)]
pub struct AccountStore {
    db: Arc<RwLock<BTreeMap<Account, AccountInfo>>>,
}

impl AccountStore {
    pub fn get(&self, _tx: &dyn Transaction, account: &Account) -> Option<AccountInfo> {
        self.db.read().unwrap().get(account).cloned()
    }

    pub fn exists(&self, tx: &dyn Transaction, account: &Account) -> bool {
        self.get(tx, account).is_some()
    }

    pub fn put(&self, _tx: &mut WriteTransaction, account: &Account, info: &AccountInfo) {
        self.db.write().unwrap().insert(*account, info.clone());
    }

    pub fn del(&self, _tx: &mut WriteTransaction, account: &Account) {
        self.db.write().unwrap().remove(account);
    }

    pub fn count(&self, _tx: &dyn Transaction) -> u64 {
        self.db.read().unwrap().len() as u64
    }

    /// Accounts in key order starting at `start`, inclusive
    pub fn iter_range(
        &self,
        _tx: &dyn Transaction,
        start: Bound<Account>,
    ) -> Vec<(Account, AccountInfo)> {
        self.db
            .read()
            .unwrap()
            .range((start, Bound::Unbounded))
            .map(|(account, info)| (*account, info.clone()))
            .collect()
    }

    pub fn iter(&self, tx: &dyn Transaction) -> Vec<(Account, AccountInfo)> {
        self.iter_range(tx, Bound::Unbounded)
    }
}

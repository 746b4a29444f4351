use crate::{Transaction, WriteTransaction};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use vanta_core::{Account, ConfirmationHeightInfo};

#[derive(Clone, Default)]
pub struct ConfirmationHeightStore {
    db: Arc<RwLock<HashMap<Account, ConfirmationHeightInfo>>>,
}

impl ConfirmationHeightStore {
    pub fn get(&self, _tx: &dyn Transaction, account: &Account) -> Option<ConfirmationHeightInfo> {
        self.db.read().unwrap().get(account).cloned()
    }

    pub fn put(
        &self,
        _tx: &mut WriteTransaction,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) {
        self.db.write().unwrap().insert(*account, info.clone());
    }

    pub fn del(&self, _tx: &mut WriteTransaction, account: &Account) {
        self.db.write().unwrap().remove(account);
    }

    pub fn count(&self, _tx: &dyn Transaction) -> u64 {
        self.db.read().unwrap().len() as u64
    }
}

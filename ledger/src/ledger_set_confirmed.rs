use vanta_core::{Account, Amount, BlockHash, SavedBlock};
use vanta_store::{Store, Transaction};

/// Read view restricted to the cemented prefix of each account chain
pub struct LedgerSetConfirmed<'a> {
    store: &'a Store,
}

impl<'a> LedgerSetConfirmed<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn get_block(&self, tx: &dyn Transaction, hash: &BlockHash) -> Option<SavedBlock> {
        let block = self.store.block.get(tx, hash)?;
        let info = self.store.confirmation_height.get(tx, &block.account())?;
        if block.height() <= info.height {
            Some(block)
        } else {
            None
        }
    }

    pub fn block_exists(&self, tx: &dyn Transaction, hash: &BlockHash) -> bool {
        self.get_block(tx, hash).is_some()
    }

    pub fn account_head(&self, tx: &dyn Transaction, account: &Account) -> Option<BlockHash> {
        let info = self.store.confirmation_height.get(tx, account)?;
        if info.height == 0 {
            None
        } else {
            Some(info.frontier)
        }
    }

    pub fn account_height(&self, tx: &dyn Transaction, account: &Account) -> u64 {
        self.store
            .confirmation_height
            .get(tx, account)
            .map(|info| info.height)
            .unwrap_or_default()
    }

    pub fn account_balance(&self, tx: &dyn Transaction, account: &Account) -> Option<Amount> {
        let head = self.account_head(tx, account)?;
        self.get_block(tx, &head).map(|b| b.balance())
    }
}

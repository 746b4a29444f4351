use crate::{Ledger, LEDGER_CONSTANTS_STUB};
use std::sync::Arc;
use vanta_core::{Account, ConfirmationHeightInfo};
use vanta_store::{Store, WriteTransaction};

/// A fresh dev-network ledger over an empty store, for tests
pub struct LedgerContext {
    pub ledger: Arc<Ledger>,
}

impl LedgerContext {
    pub fn empty() -> Self {
        let store = Store::new();
        let ledger =
            Arc::new(Ledger::new(store, LEDGER_CONSTANTS_STUB.clone()).unwrap());
        LedgerContext { ledger }
    }

    #[cfg(test)]
    pub(crate) fn genesis_block_factory(&self) -> crate::ledger_tests::AccountBlockFactory<'_> {
        crate::ledger_tests::AccountBlockFactory::genesis(&self.ledger)
    }

    #[cfg(test)]
    pub(crate) fn block_factory(&self) -> crate::ledger_tests::AccountBlockFactory<'_> {
        crate::ledger_tests::AccountBlockFactory::new(&self.ledger)
    }

    pub fn inc_confirmation_height(&self, txn: &mut WriteTransaction, account: &Account) {
        let mut height = self
            .ledger
            .store
            .confirmation_height
            .get(txn, account)
            .unwrap_or_else(|| ConfirmationHeightInfo {
                height: 0,
                frontier: self.ledger.any().account_head(txn, account).unwrap(),
            });
        height.height += 1;
        self.ledger
            .store
            .confirmation_height
            .put(txn, account, &height);
    }
}

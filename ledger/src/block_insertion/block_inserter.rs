use crate::Ledger;
use std::sync::atomic::Ordering;
use vanta_core::{
    Account, AccountInfo, Amount, Block, BlockSideband, PendingInfo, PendingKey, SavedBlock,
};
use vanta_store::WriteTransaction;

pub(crate) struct BlockInsertInstructions {
    pub account: Account,
    pub old_account_info: AccountInfo,
    pub set_account_info: AccountInfo,
    pub delete_pending: Option<PendingKey>,
    pub insert_pending: Option<(PendingKey, PendingInfo)>,
    pub set_sideband: BlockSideband,
    pub is_epoch_block: bool,
}

/// Inserts a new block into the ledger
pub(crate) struct BlockInserter<'a> {
    ledger: &'a Ledger,
    txn: &'a mut WriteTransaction,
    block: &'a Block,
    instructions: &'a BlockInsertInstructions,
}

impl<'a> BlockInserter<'a> {
    pub(crate) fn new(
        ledger: &'a Ledger,
        txn: &'a mut WriteTransaction,
        block: &'a Block,
        instructions: &'a BlockInsertInstructions,
    ) -> Self {
        Self {
            ledger,
            txn,
            block,
            instructions,
        }
    }

    pub(crate) fn insert(&mut self) -> SavedBlock {
        let saved = SavedBlock::new(self.block.clone(), self.instructions.set_sideband.clone());
        self.ledger.store.block.put(self.txn, &saved);
        self.set_successor_of_previous();
        self.update_account();
        self.delete_old_pending_info();
        self.insert_new_pending_info();
        self.delete_old_frontier();
        self.insert_new_frontier();
        self.update_representative_cache();
        self.ledger.cache.block_count.fetch_add(1, Ordering::SeqCst);
        saved
    }

    fn set_successor_of_previous(&mut self) {
        let previous = self.block.previous();
        if !previous.is_zero() {
            self.ledger
                .store
                .block
                .set_successor(self.txn, &previous, self.block.hash());
        }
    }

    fn update_account(&mut self) {
        if self.instructions.old_account_info.head.is_zero() {
            self.ledger
                .cache
                .account_count
                .fetch_add(1, Ordering::SeqCst);
        }
        self.ledger.store.account.put(
            self.txn,
            &self.instructions.account,
            &self.instructions.set_account_info,
        );
    }

    fn delete_old_frontier(&mut self) {
        let old_head = self.instructions.old_account_info.head;
        if !old_head.is_zero()
            && self
                .ledger
                .store
                .frontier
                .get(self.txn, &old_head)
                .is_some()
        {
            self.ledger.store.frontier.del(self.txn, &old_head);
        }
    }

    fn insert_new_frontier(&mut self) {
        if self.block.is_legacy() {
            self.ledger
                .store
                .frontier
                .put(self.txn, &self.block.hash(), &self.instructions.account);
        }
    }

    fn delete_old_pending_info(&mut self) {
        if let Some(key) = &self.instructions.delete_pending {
            self.ledger.store.pending.del(self.txn, key);
        }
    }

    fn insert_new_pending_info(&mut self) {
        if let Some((key, info)) = &self.instructions.insert_pending {
            self.ledger.store.pending.put(self.txn, key, info);
        }
    }

    fn update_representative_cache(&mut self) {
        if !self.instructions.old_account_info.head.is_zero() {
            // Move existing representation and add in the amount delta
            self.ledger.rep_weights.representation_add_dual(
                self.instructions.old_account_info.representative,
                Amount::zero().wrapping_sub(self.instructions.old_account_info.balance),
                self.instructions.set_account_info.representative,
                self.instructions.set_account_info.balance,
            );
        } else {
            // Add in the amount delta only
            self.ledger.rep_weights.representation_add(
                self.instructions.set_account_info.representative,
                self.instructions.set_account_info.balance,
            );
        }
    }
}

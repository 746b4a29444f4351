use super::{
    planner_factory::{account_head_block, PlannerFactory},
    rollback_planner::{RollbackInstructions, RollbackStep},
};
use crate::Ledger;
use std::sync::atomic::Ordering;
use vanta_core::{Amount, BlockHash, SavedBlock};
use vanta_store::WriteTransaction;

/// Rolls back a block and every block above it in its account chain,
/// recursing into dependent accounts when a rolled back send was already
/// received.
pub(crate) struct BlockRollbackPerformer<'a> {
    ledger: &'a Ledger,
    txn: &'a mut WriteTransaction,
    pub rolled_back: Vec<SavedBlock>,
}

impl<'a> BlockRollbackPerformer<'a> {
    pub(crate) fn new(ledger: &'a Ledger, txn: &'a mut WriteTransaction) -> Self {
        Self {
            ledger,
            txn,
            rolled_back: Vec::new(),
        }
    }

    pub(crate) fn roll_back(mut self, block_hash: &BlockHash) -> anyhow::Result<Vec<SavedBlock>> {
        self.roll_back_impl(*block_hash)?;
        Ok(self.rolled_back)
    }

    fn roll_back_impl(&mut self, block_hash: BlockHash) -> anyhow::Result<()> {
        while self.ledger.any().block_exists(self.txn, &block_hash) {
            let head_block = account_head_block(self.ledger, self.txn, &block_hash)?;
            let planner = PlannerFactory::new(self.ledger, self.txn, &head_block).create_planner()?;
            match planner.roll_back_head_block()? {
                RollbackStep::RollBackBlock(instructions) => {
                    self.execute(&head_block, instructions)
                }
                RollbackStep::RequestDependencyRollback(dependency) => {
                    self.roll_back_impl(dependency)?
                }
            }
        }
        Ok(())
    }

    fn execute(&mut self, block: &SavedBlock, instructions: RollbackInstructions) {
        self.ledger
            .store
            .block
            .del(self.txn, &instructions.block_hash);

        if let Some(previous) = instructions.clear_successor {
            self.ledger
                .store
                .block
                .set_successor(self.txn, &previous, BlockHash::zero());
        }

        self.update_account(&instructions);
        self.update_frontiers(&instructions);
        self.update_pending(&instructions);
        self.restore_representation(&instructions);

        self.ledger.cache.block_count.fetch_sub(1, Ordering::SeqCst);
        self.rolled_back.push(block.clone());
    }

    fn update_account(&mut self, instructions: &RollbackInstructions) {
        if instructions.set_account_info.head.is_zero() {
            // The open block was rolled back, the account is gone
            self.ledger.store.account.del(self.txn, &instructions.account);
            self.ledger
                .cache
                .account_count
                .fetch_sub(1, Ordering::SeqCst);
        } else {
            self.ledger.store.account.put(
                self.txn,
                &instructions.account,
                &instructions.set_account_info,
            );
        }
    }

    fn update_frontiers(&mut self, instructions: &RollbackInstructions) {
        if instructions.is_legacy {
            self.ledger
                .store
                .frontier
                .del(self.txn, &instructions.block_hash);
        }
        if instructions.previous_is_legacy {
            self.ledger.store.frontier.put(
                self.txn,
                &instructions.set_account_info.head,
                &instructions.account,
            );
        }
    }

    fn update_pending(&mut self, instructions: &RollbackInstructions) {
        if let Some(key) = &instructions.remove_pending {
            self.ledger.store.pending.del(self.txn, key);
        }
        if let Some((key, info)) = &instructions.add_pending {
            self.ledger.store.pending.put(self.txn, key, info);
        }
    }

    fn restore_representation(&mut self, instructions: &RollbackInstructions) {
        let old_info = &instructions.old_account_info;
        let new_info = &instructions.set_account_info;
        if new_info.head.is_zero() {
            self.ledger.rep_weights.representation_add(
                old_info.representative,
                Amount::zero().wrapping_sub(old_info.balance),
            );
        } else {
            self.ledger.rep_weights.representation_add_dual(
                old_info.representative,
                Amount::zero().wrapping_sub(old_info.balance),
                new_info.representative,
                new_info.balance,
            );
        }
    }
}

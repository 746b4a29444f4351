use super::rollback_planner::RollbackPlanner;
use crate::Ledger;
use vanta_core::{utils::seconds_since_epoch, Account, BlockHash, PendingKey, PublicKey, SavedBlock};
use vanta_store::Transaction;

pub(crate) struct PlannerFactory<'a> {
    ledger: &'a Ledger,
    txn: &'a dyn Transaction,
    head_block: &'a SavedBlock,
}

impl<'a> PlannerFactory<'a> {
    pub(crate) fn new(
        ledger: &'a Ledger,
        txn: &'a dyn Transaction,
        head_block: &'a SavedBlock,
    ) -> Self {
        Self {
            ledger,
            txn,
            head_block,
        }
    }

    pub(crate) fn create_planner(&self) -> anyhow::Result<RollbackPlanner<'a>> {
        let account = self.head_block.account();
        let current_account_info = self
            .ledger
            .any()
            .get_account(self.txn, &account)
            .ok_or_else(|| anyhow!("account to roll back not found"))?;

        let previous = if self.head_block.previous().is_zero() {
            None
        } else {
            self.ledger.any().get_block(self.txn, &self.head_block.previous())
        };

        let destination = self.head_block.destination_or_link();
        let pending_receive = if self.head_block.is_send() {
            self.ledger.store.pending.get(
                self.txn,
                &PendingKey::new(destination, self.head_block.hash()),
            )
        } else {
            None
        };

        let linked_account = if self.head_block.is_receive() {
            self.ledger
                .any()
                .block_account(self.txn, &self.head_block.source_or_link())
                .unwrap_or_default()
        } else {
            Account::zero()
        };

        Ok(RollbackPlanner {
            epochs: &self.ledger.constants.epochs,
            head_block: self.head_block.clone(),
            account,
            current_account_info,
            previous_representative: self.find_previous_representative(),
            previous,
            linked_account,
            pending_receive,
            latest_block_for_destination: self.ledger.any().account_head(self.txn, &destination),
            confirmation_height: self
                .ledger
                .store
                .confirmation_height
                .get(self.txn, &account)
                .unwrap_or_default(),
            seconds_since_epoch: seconds_since_epoch(),
        })
    }

    /// Walks the chain backwards from the predecessor until a block carrying
    /// a representative field is found. Legacy send and receive blocks do
    /// not name a representative.
    fn find_previous_representative(&self) -> Option<PublicKey> {
        let mut hash = self.head_block.previous();
        while !hash.is_zero() {
            let block = self.ledger.any().get_block(self.txn, &hash)?;
            if let Some(representative) = block.representative_field() {
                return Some(representative);
            }
            hash = block.previous();
        }
        None
    }
}

pub(crate) fn account_head_block(
    ledger: &Ledger,
    txn: &dyn Transaction,
    block_hash: &BlockHash,
) -> anyhow::Result<SavedBlock> {
    let block = ledger
        .any()
        .get_block(txn, block_hash)
        .ok_or_else(|| anyhow!("block to roll back not found"))?;
    let info = ledger
        .any()
        .get_account(txn, &block.account())
        .ok_or_else(|| anyhow!("account of rollback block not found"))?;
    ledger
        .any()
        .get_block(txn, &info.head)
        .ok_or_else(|| anyhow!("head block not found"))
}

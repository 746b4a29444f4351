use super::validation::BlockValidator;
use crate::Ledger;
use vanta_core::{utils::seconds_since_epoch, Account, Block, PendingKey};
use vanta_store::Transaction;

/// Loads everything the validator needs from the store
pub(crate) struct BlockValidatorFactory<'a> {
    ledger: &'a Ledger,
    txn: &'a dyn Transaction,
    block: &'a Block,
}

impl<'a> BlockValidatorFactory<'a> {
    pub(crate) fn new(ledger: &'a Ledger, txn: &'a dyn Transaction, block: &'a Block) -> Self {
        Self { ledger, txn, block }
    }

    pub(crate) fn create_validator(&self) -> BlockValidator<'a> {
        let account = self.query_account().unwrap_or_default();
        let old_account_info = self.ledger.any().get_account(self.txn, &account);
        let previous_block = if self.block.previous().is_zero() {
            None
        } else {
            self.ledger.any().get_block(self.txn, &self.block.previous())
        };

        let pending_receive_key =
            self.query_pending_receive_key(&account, &old_account_info, &previous_block);
        let pending_receive_info = pending_receive_key
            .as_ref()
            .and_then(|key| self.ledger.store.pending.get(self.txn, key));
        let source_block_exists = pending_receive_key
            .as_ref()
            .map(|key| {
                self.ledger
                    .any()
                    .block_exists(self.txn, &key.send_block_hash)
            })
            .unwrap_or(false);

        BlockValidator {
            block: self.block,
            epochs: &self.ledger.constants.epochs,
            work: &self.ledger.constants.work,
            burn_account: self.ledger.constants.burn_account,
            block_exists: self.ledger.any().block_exists(self.txn, &self.block.hash()),
            account,
            previous_block,
            old_account_info,
            pending_receive_info,
            any_pending_exists: self.ledger.store.pending.any_for_account(self.txn, &account),
            source_block_exists,
            seconds_since_epoch: seconds_since_epoch(),
        }
    }

    /// The owning account: carried by open and state blocks, derived from
    /// the predecessor's sideband for other legacy blocks
    fn query_account(&self) -> Option<Account> {
        match self.block.account_field() {
            Some(account) => Some(account),
            None => self.ledger.any().block_account(self.txn, &self.block.previous()),
        }
    }

    fn query_pending_receive_key(
        &self,
        account: &Account,
        old_account_info: &Option<vanta_core::AccountInfo>,
        previous_block: &Option<vanta_core::SavedBlock>,
    ) -> Option<PendingKey> {
        match self.block {
            Block::LegacyOpen(open) => Some(PendingKey::new(*account, open.source)),
            Block::LegacyReceive(receive) => Some(PendingKey::new(*account, receive.source)),
            Block::State(state) => {
                if state.link.is_zero() || self.ledger.is_epoch_link(&state.link) {
                    return None;
                }
                let receives = match old_account_info {
                    Some(info) => state.balance >= info.balance,
                    None => true,
                };
                // A receive on top of a missing previous cannot be classified
                if !state.previous.is_zero() && previous_block.is_none() {
                    return None;
                }
                if receives {
                    Some(PendingKey::new(*account, state.link.into()))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

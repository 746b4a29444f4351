use crate::Ledger;
use vanta_core::{Block, BlockHash, SavedBlock, StateBlock};
use vanta_store::Transaction;

/// The blocks a block depends on: its predecessor in the account chain and,
/// for receive subtypes, the source send.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DependentBlocks {
    pub previous: BlockHash,
    pub source: BlockHash,
}

impl DependentBlocks {
    pub fn new(previous: BlockHash, source: BlockHash) -> Self {
        Self { previous, source }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockHash> {
        [&self.previous, &self.source]
            .into_iter()
            .filter(|hash| !hash.is_zero())
    }
}

/// Finds the dependent blocks for a given block.
/// There can be at most two dependencies per block: "previous" and
/// "link/source".
pub struct DependentBlocksFinder<'a> {
    ledger: &'a Ledger,
    txn: &'a dyn Transaction,
}

impl<'a> DependentBlocksFinder<'a> {
    pub fn new(ledger: &'a Ledger, txn: &'a dyn Transaction) -> Self {
        Self { ledger, txn }
    }

    pub fn find_dependent_blocks(&self, block: &SavedBlock) -> DependentBlocks {
        let source = if block.is_receive() {
            block.source_or_link()
        } else {
            BlockHash::zero()
        };
        let previous = if block.account() == self.ledger.constants.genesis_account
            && block.is_open()
        {
            BlockHash::zero()
        } else {
            block.previous()
        };
        DependentBlocks::new(previous, source)
    }

    /// Like `find_dependent_blocks`, but tolerant to the block not having
    /// sideband information attached. Needed for forks which were never
    /// inserted into the ledger.
    pub fn find_dependent_blocks_for_unsaved_block(&self, block: &Block) -> DependentBlocks {
        match block {
            Block::LegacyOpen(open) => {
                let source = if open.account == self.ledger.constants.genesis_account {
                    // The genesis open has no source
                    BlockHash::zero()
                } else {
                    open.source
                };
                DependentBlocks::new(BlockHash::zero(), source)
            }
            Block::LegacyReceive(receive) => DependentBlocks::new(receive.previous, receive.source),
            Block::LegacySend(send) => DependentBlocks::new(send.previous, BlockHash::zero()),
            Block::LegacyChange(change) => DependentBlocks::new(change.previous, BlockHash::zero()),
            Block::State(state) => {
                let linked_block = if self.is_receive_or_change(state) {
                    state.link.into()
                } else {
                    BlockHash::zero()
                };
                DependentBlocks::new(block.previous(), linked_block)
            }
        }
    }

    fn is_receive_or_change(&self, state: &StateBlock) -> bool {
        !self.ledger.is_epoch_link(&state.link) && !self.is_send(state)
    }

    // Tolerant to the previous block being absent; a missing previous means
    // the balance delta cannot be classified as a send
    fn is_send(&self, block: &StateBlock) -> bool {
        if block.previous.is_zero() {
            return false;
        }

        let previous_balance = self
            .ledger
            .any()
            .block_balance(self.txn, &block.previous)
            .unwrap_or_default();

        block.balance < previous_balance
    }
}

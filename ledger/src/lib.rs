#[macro_use]
extern crate anyhow;

mod block_cementer;
mod block_insertion;
mod block_rollback;
mod dependent_blocks_finder;
mod ledger;
mod ledger_constants;
mod ledger_context;
mod ledger_set_any;
mod ledger_set_confirmed;
mod rep_weights;
mod write_queue;

#[cfg(test)]
mod ledger_tests;

pub use dependent_blocks_finder::{DependentBlocks, DependentBlocksFinder};
pub use ledger::Ledger;
pub use ledger_constants::{
    LedgerConstants, DEV_GENESIS_ACCOUNT, DEV_GENESIS_BLOCK, DEV_GENESIS_HASH, DEV_GENESIS_KEY,
    DEV_GENESIS_PUB_KEY, LEDGER_CONSTANTS_STUB,
};
pub use ledger_context::LedgerContext;
pub use ledger_set_any::LedgerSetAny;
pub use ledger_set_confirmed::LedgerSetConfirmed;
pub use rep_weights::RepWeightCache;
pub use write_queue::{WriteGuard, WriteQueue, Writer};

/// Closed set of outcomes of applying a block to the ledger
#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BlockStatus {
    /// Block accepted, state updated
    Progress,
    /// Already stored
    Old,
    /// Signature does not verify
    BadSignature,
    /// The previous block is unknown
    GapPrevious,
    /// The referenced source block is unknown
    GapSource,
    /// Epoch open without a prior pending entry
    GapEpochOpenPending,
    /// The chain slot named by (root, previous) is already taken
    Fork,
    /// Send with declared balance not below the previous balance
    NegativeSpend,
    /// Receive or open references a non pending send
    Unreceivable,
    /// Attempt to open the sentinel burn account
    OpenedBurnAccount,
    /// Declared balance inconsistent with the link
    BalanceMismatch,
    /// Epoch block changes the representative
    RepresentativeMismatch,
    /// Legacy block after a state block, or wrong subtype ordering
    BlockPosition,
    /// Proof of work below the threshold for the block's details
    InsufficientWork,
}

impl BlockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockStatus::Progress => "Progress",
            BlockStatus::Old => "Old",
            BlockStatus::BadSignature => "Bad signature",
            BlockStatus::GapPrevious => "Gap previous",
            BlockStatus::GapSource => "Gap source",
            BlockStatus::GapEpochOpenPending => "Gap epoch open pending",
            BlockStatus::Fork => "Fork",
            BlockStatus::NegativeSpend => "Negative spend",
            BlockStatus::Unreceivable => "Unreceivable",
            BlockStatus::OpenedBurnAccount => "Opened burn account",
            BlockStatus::BalanceMismatch => "Balance mismatch",
            BlockStatus::RepresentativeMismatch => "Representative mismatch",
            BlockStatus::BlockPosition => "Block position",
            BlockStatus::InsufficientWork => "Insufficient work",
        }
    }
}

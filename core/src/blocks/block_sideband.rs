use crate::{Account, Amount, BlockDetails, BlockHash, Epoch};

/// Metadata attached to a block when it is stored in the ledger
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BlockSideband {
    pub height: u64,
    /// Seconds since unix epoch at apply time
    pub timestamp: u64,
    /// Next block in the account chain, zero for the frontier
    pub successor: BlockHash,
    pub account: Account,
    pub balance: Amount,
    pub details: BlockDetails,
    /// Epoch of the source send for receive subtypes
    pub source_epoch: Epoch,
}

impl BlockSideband {
    pub fn new(
        account: Account,
        successor: BlockHash,
        balance: Amount,
        height: u64,
        timestamp: u64,
        details: BlockDetails,
        source_epoch: Epoch,
    ) -> Self {
        Self {
            height,
            timestamp,
            successor,
            account,
            balance,
            details,
            source_epoch,
        }
    }
}

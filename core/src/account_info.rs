use crate::{Amount, BlockHash, Epoch, PublicKey};

/// Latest information about an account
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct AccountInfo {
    pub head: BlockHash,
    pub representative: PublicKey,
    pub open_block: BlockHash,
    pub balance: Amount,
    /// Seconds since unix epoch
    pub modified: u64,
    pub block_count: u64,
    pub epoch: Epoch,
}

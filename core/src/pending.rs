use crate::{Account, Amount, BlockHash, Epoch};

/// Key of a receivable: the destination account and the hash of the send
/// block that created the claim.
#[derive(Default, PartialEq, Eq, Debug, Clone, PartialOrd, Ord, Hash)]
pub struct PendingKey {
    pub receiving_account: Account,
    pub send_block_hash: BlockHash,
}

impl PendingKey {
    pub fn new(receiving_account: Account, send_block_hash: BlockHash) -> Self {
        Self {
            receiving_account,
            send_block_hash,
        }
    }
}

/// Information on a receivable, awaiting the matching receive block
#[derive(Default, PartialEq, Eq, Debug, Clone)]
pub struct PendingInfo {
    pub source: Account,
    pub amount: Amount,
    pub epoch: Epoch,
}

impl PendingInfo {
    pub fn new(source: Account, amount: Amount, epoch: Epoch) -> Self {
        Self {
            source,
            amount,
            epoch,
        }
    }
}

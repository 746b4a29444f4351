use crate::{Block, BlockHash};

/// A block buffered until its missing dependency arrives
#[derive(Clone, Debug)]
pub struct UncheckedInfo {
    pub block: Block,

    /// Seconds since posix epoch
    pub modified: u64,
}

impl UncheckedInfo {
    pub fn new(block: Block) -> Self {
        Self {
            block,
            modified: crate::utils::seconds_since_epoch(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UncheckedKey {
    /// The missing dependency (previous block or receive source)
    pub previous: BlockHash,
    pub hash: BlockHash,
}

impl UncheckedKey {
    pub fn new(previous: BlockHash, hash: BlockHash) -> Self {
        Self { previous, hash }
    }
}

use crate::BlockHash;

u256_struct!(Root);
u256_struct!(Link);

impl From<BlockHash> for Link {
    fn from(value: BlockHash) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<crate::Account> for Link {
    fn from(value: crate::Account) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

/// Uniquely identifies the chain slot a block occupies: two blocks with the
/// same qualified root are forks of each other.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct QualifiedRoot {
    pub root: Root,
    pub previous: BlockHash,
}

impl QualifiedRoot {
    pub fn new(root: Root, previous: BlockHash) -> Self {
        Self { root, previous }
    }
}

impl std::fmt::Debug for QualifiedRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.root, self.previous)
    }
}

impl std::fmt::Display for QualifiedRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.root, self.previous)
    }
}

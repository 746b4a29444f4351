use crate::{Link, Root};
use blake2::{
    digest::{Update, VariableOutput},
    Blake2bVar,
};

u256_struct!(BlockHash);

impl From<Link> for BlockHash {
    fn from(value: Link) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<Root> for BlockHash {
    fn from(value: Root) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<BlockHash> for Root {
    fn from(value: BlockHash) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<&BlockHash> for Root {
    fn from(value: &BlockHash) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

/// Incremental blake2b-256 digest over the hashable fields of a block
pub struct BlockHashBuilder {
    hasher: Blake2bVar,
}

impl Default for BlockHashBuilder {
    fn default() -> Self {
        Self {
            hasher: Blake2bVar::new(32).unwrap(),
        }
    }
}

impl BlockHashBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn update(mut self, data: impl AsRef<[u8]>) -> Self {
        self.hasher.update(data.as_ref());
        self
    }

    pub fn build(self) -> BlockHash {
        let mut hash_bytes = [0u8; 32];
        self.hasher.finalize_variable(&mut hash_bytes).unwrap();
        BlockHash::from_bytes(hash_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_is_deterministic() {
        let a = BlockHashBuilder::new().update(b"abc").build();
        let b = BlockHashBuilder::new().update(b"abc").build();
        let c = BlockHashBuilder::new().update(b"abd").build();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

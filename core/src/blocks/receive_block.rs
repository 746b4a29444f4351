use crate::{BlockHash, BlockHashBuilder, PrivateKey, Signature};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReceiveBlock {
    pub previous: BlockHash,
    pub source: BlockHash,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl ReceiveBlock {
    pub fn new(previous: BlockHash, source: BlockHash, key: &PrivateKey, work: u64) -> Self {
        let hash = Self::hash_parts(&previous, &source);
        let signature = key.sign(hash.as_bytes());
        Self {
            previous,
            source,
            signature,
            work,
            hash,
        }
    }

    fn hash_parts(previous: &BlockHash, source: &BlockHash) -> BlockHash {
        BlockHashBuilder::new()
            .update(previous.as_bytes())
            .update(source.as_bytes())
            .build()
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }
}

use crate::{BlockHash, BlockHashBuilder, PrivateKey, PublicKey, Signature};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ChangeBlock {
    pub previous: BlockHash,
    pub representative: PublicKey,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl ChangeBlock {
    pub fn new(
        previous: BlockHash,
        representative: PublicKey,
        key: &PrivateKey,
        work: u64,
    ) -> Self {
        let hash = Self::hash_parts(&previous, &representative);
        let signature = key.sign(hash.as_bytes());
        Self {
            previous,
            representative,
            signature,
            work,
            hash,
        }
    }

    fn hash_parts(previous: &BlockHash, representative: &PublicKey) -> BlockHash {
        BlockHashBuilder::new()
            .update(previous.as_bytes())
            .update(representative.as_bytes())
            .build()
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }
}

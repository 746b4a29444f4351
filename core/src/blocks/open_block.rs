use crate::{Account, BlockHash, BlockHashBuilder, PrivateKey, PublicKey, Signature};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OpenBlock {
    pub source: BlockHash,
    pub representative: PublicKey,
    pub account: Account,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl OpenBlock {
    pub fn new(
        source: BlockHash,
        representative: PublicKey,
        account: Account,
        key: &PrivateKey,
        work: u64,
    ) -> Self {
        let hash = Self::hash_parts(&source, &representative, &account);
        let signature = key.sign(hash.as_bytes());
        Self {
            source,
            representative,
            account,
            signature,
            work,
            hash,
        }
    }

    fn hash_parts(source: &BlockHash, representative: &PublicKey, account: &Account) -> BlockHash {
        BlockHashBuilder::new()
            .update(source.as_bytes())
            .update(representative.as_bytes())
            .update(account.as_bytes())
            .build()
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }
}

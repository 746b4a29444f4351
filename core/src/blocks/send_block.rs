use crate::{Account, Amount, BlockHash, BlockHashBuilder, PrivateKey, Signature};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SendBlock {
    pub previous: BlockHash,
    pub destination: Account,
    pub balance: Amount,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl SendBlock {
    pub fn new(
        previous: BlockHash,
        destination: Account,
        balance: Amount,
        key: &PrivateKey,
        work: u64,
    ) -> Self {
        let hash = Self::hash_parts(&previous, &destination, &balance);
        let signature = key.sign(hash.as_bytes());
        Self {
            previous,
            destination,
            balance,
            signature,
            work,
            hash,
        }
    }

    fn hash_parts(previous: &BlockHash, destination: &Account, balance: &Amount) -> BlockHash {
        BlockHashBuilder::new()
            .update(previous.as_bytes())
            .update(destination.as_bytes())
            .update(balance.to_be_bytes())
            .build()
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }
}

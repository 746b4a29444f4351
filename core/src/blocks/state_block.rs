use crate::{
    Account, Amount, BlockHash, BlockHashBuilder, Link, PrivateKey, PublicKey, Signature,
};

/// The universal block variant. Carries the full account state; the subtype
/// (send, receive, change, epoch) is derived at apply time.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StateBlock {
    pub account: Account,
    pub previous: BlockHash,
    pub representative: PublicKey,
    pub balance: Amount,
    pub link: Link,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl StateBlock {
    pub fn new(
        account: Account,
        previous: BlockHash,
        representative: PublicKey,
        balance: Amount,
        link: Link,
        key: &PrivateKey,
        work: u64,
    ) -> Self {
        let hash = Self::hash_parts(&account, &previous, &representative, &balance, &link);
        let signature = key.sign(hash.as_bytes());
        Self {
            account,
            previous,
            representative,
            balance,
            link,
            signature,
            work,
            hash,
        }
    }

    pub fn with_signature(
        account: Account,
        previous: BlockHash,
        representative: PublicKey,
        balance: Amount,
        link: Link,
        signature: Signature,
        work: u64,
    ) -> Self {
        let hash = Self::hash_parts(&account, &previous, &representative, &balance, &link);
        Self {
            account,
            previous,
            representative,
            balance,
            link,
            signature,
            work,
            hash,
        }
    }

    fn hash_parts(
        account: &Account,
        previous: &BlockHash,
        representative: &PublicKey,
        balance: &Amount,
        link: &Link,
    ) -> BlockHash {
        // A one-in-the-lowest-byte preamble distinguishes state block
        // preimages from legacy open preimages
        let mut preamble = [0u8; 32];
        preamble[31] = 0x6;
        BlockHashBuilder::new()
            .update(preamble)
            .update(account.as_bytes())
            .update(previous.as_bytes())
            .update(representative.as_bytes())
            .update(balance.to_be_bytes())
            .update(link.as_bytes())
            .build()
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn verify_signature(&self) -> anyhow::Result<()> {
        crate::validate_message(
            &self.account.into(),
            self.hash.as_bytes(),
            &self.signature,
        )
    }
}

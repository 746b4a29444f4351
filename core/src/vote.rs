use crate::{validate_message, BlockHash, BlockHashBuilder, PrivateKey, PublicKey, Signature};

/// A signed statement by a representative naming the blocks it currently
/// considers the winners of their chain slots. Higher `(timestamp, hash)`
/// supersedes lower for the same representative.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Vote {
    pub voting_account: PublicKey,
    /// Also the vote sequence number; `FINAL_TIMESTAMP` marks a final vote
    pub timestamp: u64,
    pub hashes: Vec<BlockHash>,
    pub signature: Signature,
}

impl Vote {
    pub const FINAL_TIMESTAMP: u64 = u64::MAX;

    /// Maximum number of hashes a single vote may carry
    pub const MAX_HASHES: usize = 12;

    pub fn new(key: &PrivateKey, timestamp: u64, hashes: Vec<BlockHash>) -> Self {
        let mut result = Self {
            voting_account: key.public_key(),
            timestamp,
            hashes,
            signature: Signature::zero(),
        };
        result.signature = key.sign(result.hash().as_bytes());
        result
    }

    pub fn new_final(key: &PrivateKey, hashes: Vec<BlockHash>) -> Self {
        Self::new(key, Self::FINAL_TIMESTAMP, hashes)
    }

    pub fn is_final(&self) -> bool {
        self.timestamp == Self::FINAL_TIMESTAMP
    }

    /// Digest the signature is computed over
    pub fn hash(&self) -> BlockHash {
        let mut builder = BlockHashBuilder::new().update(b"vote ");
        for hash in &self.hashes {
            builder = builder.update(hash.as_bytes());
        }
        builder.update(self.timestamp.to_le_bytes()).build()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_message(
            &self.voting_account,
            self.hash().as_bytes(),
            &self.signature,
        )
    }
}

/// Outcome of processing a single (vote, hash) pair
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum VoteCode {
    /// Signature check failed
    Invalid,
    /// Already seen this or a newer vote from the representative, or the
    /// slot was recently confirmed
    Replay,
    /// Vote accepted and applied
    Vote,
    /// No election for the hash; routed to the inactive vote cache
    Indeterminate,
    /// Vote is newer but arrived within the cooldown window
    Ignored,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum VoteSource {
    /// Received from the network
    Live,
    /// Replayed from the inactive vote cache
    Cache,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_vote_validates() {
        let key = PrivateKey::from(1);
        let vote = Vote::new(&key, 7, vec![BlockHash::from(1), BlockHash::from(2)]);
        assert!(vote.validate().is_ok());
    }

    #[test]
    fn tampered_vote_fails() {
        let key = PrivateKey::from(1);
        let mut vote = Vote::new(&key, 7, vec![BlockHash::from(1)]);
        vote.timestamp = 8;
        assert!(vote.validate().is_err());
    }

    #[test]
    fn final_vote() {
        let key = PrivateKey::from(1);
        let vote = Vote::new_final(&key, vec![BlockHash::from(1)]);
        assert!(vote.is_final());
        assert_eq!(vote.timestamp, Vote::FINAL_TIMESTAMP);
        assert!(vote.validate().is_ok());
    }

    #[test]
    fn hash_depends_on_hashes_and_timestamp() {
        let key = PrivateKey::from(1);
        let a = Vote::new(&key, 1, vec![BlockHash::from(1)]);
        let b = Vote::new(&key, 2, vec![BlockHash::from(1)]);
        let c = Vote::new(&key, 1, vec![BlockHash::from(2)]);
        assert_ne!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
    }
}

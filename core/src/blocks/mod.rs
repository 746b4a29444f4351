mod block_details;
pub use block_details::BlockDetails;

mod block_sideband;
pub use block_sideband::BlockSideband;

mod change_block;
pub use change_block::ChangeBlock;

mod open_block;
pub use open_block::OpenBlock;

mod receive_block;
pub use receive_block::ReceiveBlock;

mod send_block;
pub use send_block::SendBlock;

mod state_block;
pub use state_block::StateBlock;

use crate::{
    Account, Amount, BlockHash, BlockHashBuilder, Epoch, Link, PublicKey, QualifiedRoot, Root,
    Signature,
};
use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy, FromPrimitive)]
pub enum BlockType {
    Invalid = 0,
    NotABlock = 1,
    LegacySend = 2,
    LegacyReceive = 3,
    LegacyOpen = 4,
    LegacyChange = 5,
    State = 6,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BlockSubType {
    Send,
    Receive,
    Open,
    Change,
    Epoch,
}

impl BlockSubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockSubType::Send => "send",
            BlockSubType::Receive => "receive",
            BlockSubType::Open => "open",
            BlockSubType::Change => "change",
            BlockSubType::Epoch => "epoch",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Block {
    LegacySend(SendBlock),
    LegacyReceive(ReceiveBlock),
    LegacyOpen(OpenBlock),
    LegacyChange(ChangeBlock),
    State(StateBlock),
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::LegacySend(_) => BlockType::LegacySend,
            Block::LegacyReceive(_) => BlockType::LegacyReceive,
            Block::LegacyOpen(_) => BlockType::LegacyOpen,
            Block::LegacyChange(_) => BlockType::LegacyChange,
            Block::State(_) => BlockType::State,
        }
    }

    pub fn hash(&self) -> BlockHash {
        match self {
            Block::LegacySend(b) => b.hash(),
            Block::LegacyReceive(b) => b.hash(),
            Block::LegacyOpen(b) => b.hash(),
            Block::LegacyChange(b) => b.hash(),
            Block::State(b) => b.hash(),
        }
    }

    pub fn previous(&self) -> BlockHash {
        match self {
            Block::LegacySend(b) => b.previous,
            Block::LegacyReceive(b) => b.previous,
            Block::LegacyOpen(_) => BlockHash::zero(),
            Block::LegacyChange(b) => b.previous,
            Block::State(b) => b.previous,
        }
    }

    /// The previous block for non open blocks, the account for open blocks.
    /// This is the value proof of work is computed over.
    pub fn root(&self) -> Root {
        match self {
            Block::LegacyOpen(b) => b.account.into(),
            Block::State(b) if b.previous.is_zero() => b.account.into(),
            _ => self.previous().into(),
        }
    }

    pub fn qualified_root(&self) -> QualifiedRoot {
        QualifiedRoot::new(self.root(), self.previous())
    }

    pub fn account_field(&self) -> Option<Account> {
        match self {
            Block::LegacyOpen(b) => Some(b.account),
            Block::State(b) => Some(b.account),
            _ => None,
        }
    }

    pub fn balance_field(&self) -> Option<Amount> {
        match self {
            Block::LegacySend(b) => Some(b.balance),
            Block::State(b) => Some(b.balance),
            _ => None,
        }
    }

    pub fn link_field(&self) -> Option<Link> {
        match self {
            Block::State(b) => Some(b.link),
            _ => None,
        }
    }

    /// Source block for legacy open/receive blocks, None otherwise
    pub fn source_field(&self) -> Option<BlockHash> {
        match self {
            Block::LegacyReceive(b) => Some(b.source),
            Block::LegacyOpen(b) => Some(b.source),
            _ => None,
        }
    }

    pub fn destination_field(&self) -> Option<Account> {
        match self {
            Block::LegacySend(b) => Some(b.destination),
            _ => None,
        }
    }

    pub fn representative_field(&self) -> Option<PublicKey> {
        match self {
            Block::LegacyOpen(b) => Some(b.representative),
            Block::LegacyChange(b) => Some(b.representative),
            Block::State(b) => Some(b.representative),
            _ => None,
        }
    }

    pub fn block_signature(&self) -> &Signature {
        match self {
            Block::LegacySend(b) => &b.signature,
            Block::LegacyReceive(b) => &b.signature,
            Block::LegacyOpen(b) => &b.signature,
            Block::LegacyChange(b) => &b.signature,
            Block::State(b) => &b.signature,
        }
    }

    pub fn set_block_signature(&mut self, signature: Signature) {
        match self {
            Block::LegacySend(b) => b.signature = signature,
            Block::LegacyReceive(b) => b.signature = signature,
            Block::LegacyOpen(b) => b.signature = signature,
            Block::LegacyChange(b) => b.signature = signature,
            Block::State(b) => b.signature = signature,
        }
    }

    pub fn work(&self) -> u64 {
        match self {
            Block::LegacySend(b) => b.work,
            Block::LegacyReceive(b) => b.work,
            Block::LegacyOpen(b) => b.work,
            Block::LegacyChange(b) => b.work,
            Block::State(b) => b.work,
        }
    }

    pub fn set_work(&mut self, work: u64) {
        match self {
            Block::LegacySend(b) => b.work = work,
            Block::LegacyReceive(b) => b.work = work,
            Block::LegacyOpen(b) => b.work = work,
            Block::LegacyChange(b) => b.work = work,
            Block::State(b) => b.work = work,
        }
    }

    pub fn is_open(&self) -> bool {
        match self {
            Block::LegacyOpen(_) => true,
            Block::State(b) => b.previous.is_zero(),
            _ => false,
        }
    }

    pub fn is_legacy(&self) -> bool {
        !matches!(self, Block::State(_))
    }

    /// Digest over hash, signature and work. Two wire representations of the
    /// same slot content (e.g. a republish with higher work) differ here.
    pub fn full_hash(&self) -> BlockHash {
        BlockHashBuilder::new()
            .update(self.hash().as_bytes())
            .update(self.block_signature().as_bytes())
            .update(self.work().to_ne_bytes())
            .build()
    }

    /// Legacy blocks may not follow a state block in the same chain
    pub fn valid_predecessor(&self, block_type: BlockType) -> bool {
        match self {
            Block::State(_) => true,
            Block::LegacyOpen(_) => false,
            _ => matches!(
                block_type,
                BlockType::LegacySend
                    | BlockType::LegacyReceive
                    | BlockType::LegacyOpen
                    | BlockType::LegacyChange
            ),
        }
    }

    pub fn json_representation(&self) -> JsonBlock {
        match self {
            Block::LegacySend(b) => JsonBlock::Send {
                previous: b.previous,
                destination: b.destination,
                balance: b.balance.encode_hex(),
                signature: b.signature,
                work: format!("{:016x}", b.work),
            },
            Block::LegacyReceive(b) => JsonBlock::Receive {
                previous: b.previous,
                source: b.source,
                signature: b.signature,
                work: format!("{:016x}", b.work),
            },
            Block::LegacyOpen(b) => JsonBlock::Open {
                source: b.source,
                representative: b.representative,
                account: b.account,
                signature: b.signature,
                work: format!("{:016x}", b.work),
            },
            Block::LegacyChange(b) => JsonBlock::Change {
                previous: b.previous,
                representative: b.representative,
                signature: b.signature,
                work: format!("{:016x}", b.work),
            },
            Block::State(b) => JsonBlock::State {
                account: b.account,
                previous: b.previous,
                representative: b.representative,
                balance: b.balance,
                link: b.link,
                signature: b.signature,
                work: format!("{:016x}", b.work),
            },
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.json_representation())?)
    }
}

/// Diagnostic JSON form of a block
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonBlock {
    Send {
        previous: BlockHash,
        destination: Account,
        balance: String,
        signature: Signature,
        work: String,
    },
    Receive {
        previous: BlockHash,
        source: BlockHash,
        signature: Signature,
        work: String,
    },
    Open {
        source: BlockHash,
        representative: PublicKey,
        account: Account,
        signature: Signature,
        work: String,
    },
    Change {
        previous: BlockHash,
        representative: PublicKey,
        signature: Signature,
        work: String,
    },
    State {
        account: Account,
        previous: BlockHash,
        representative: PublicKey,
        balance: Amount,
        link: Link,
        signature: Signature,
        work: String,
    },
}

/// A block together with the sideband computed when it was applied
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SavedBlock {
    pub block: Block,
    pub sideband: BlockSideband,
}

impl SavedBlock {
    pub fn new(block: Block, sideband: BlockSideband) -> Self {
        Self { block, sideband }
    }

    pub fn account(&self) -> Account {
        self.sideband.account
    }

    pub fn balance(&self) -> Amount {
        self.sideband.balance
    }

    pub fn height(&self) -> u64 {
        self.sideband.height
    }

    pub fn timestamp(&self) -> u64 {
        self.sideband.timestamp
    }

    pub fn epoch(&self) -> Epoch {
        self.sideband.details.epoch
    }

    pub fn source_epoch(&self) -> Epoch {
        self.sideband.source_epoch
    }

    pub fn successor(&self) -> Option<BlockHash> {
        if self.sideband.successor.is_zero() {
            None
        } else {
            Some(self.sideband.successor)
        }
    }

    pub fn is_send(&self) -> bool {
        self.sideband.details.is_send
    }

    pub fn is_receive(&self) -> bool {
        self.sideband.details.is_receive
    }

    pub fn is_epoch(&self) -> bool {
        self.sideband.details.is_epoch
    }

    /// The hash this block received from, for receive subtypes
    pub fn source_or_link(&self) -> BlockHash {
        self.block
            .source_field()
            .unwrap_or_else(|| self.block.link_field().unwrap_or_default().into())
    }

    /// The account this block sent to, for send subtypes
    pub fn destination_or_link(&self) -> Account {
        self.block
            .destination_field()
            .unwrap_or_else(|| self.block.link_field().unwrap_or_default().into())
    }

    pub fn subtype(&self) -> BlockSubType {
        if self.is_send() {
            BlockSubType::Send
        } else if self.is_receive() {
            BlockSubType::Receive
        } else if self.is_epoch() {
            BlockSubType::Epoch
        } else if self.block.is_open() {
            BlockSubType::Open
        } else {
            BlockSubType::Change
        }
    }
}

impl Deref for SavedBlock {
    type Target = Block;

    fn deref(&self) -> &Self::Target {
        &self.block
    }
}

impl From<SavedBlock> for Block {
    fn from(value: SavedBlock) -> Self {
        value.block
    }
}

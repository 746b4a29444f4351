use crate::{BlockHash, Link, Root};

u256_struct!(Account);
u256_struct!(PublicKey);

impl Account {
    /// Human readable form used in logs and RPC style output
    pub fn encode_account(&self) -> String {
        format!("vanta_{}", self.encode_hex().to_lowercase())
    }

    pub fn decode_account(source: impl AsRef<str>) -> anyhow::Result<Self> {
        let s = source.as_ref();
        let hex = s
            .strip_prefix("vanta_")
            .ok_or_else(|| anyhow!("invalid account prefix"))?;
        Self::decode_hex(hex.to_uppercase())
    }
}

impl From<PublicKey> for Account {
    fn from(value: PublicKey) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<&PublicKey> for Account {
    fn from(value: &PublicKey) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<Account> for PublicKey {
    fn from(value: Account) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<&Account> for PublicKey {
    fn from(value: &Account) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<Link> for Account {
    fn from(value: Link) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<BlockHash> for Account {
    fn from(value: BlockHash) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<Root> for Account {
    fn from(value: Root) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<Account> for Root {
    fn from(value: Account) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

impl From<&Account> for Root {
    fn from(value: &Account) -> Self {
        Self::from_bytes(*value.as_bytes())
    }
}

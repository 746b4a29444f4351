use crate::{validate_message, Link, PublicKey};
use std::collections::HashMap;

#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub enum Epoch {
    Invalid = 0,
    #[default]
    Unspecified = 1,
    Epoch0 = 2,
    Epoch1 = 3,
    Epoch2 = 4,
}

impl Epoch {
    pub const MAX: Epoch = Epoch::Epoch2;

    pub fn epoch_number(&self) -> u8 {
        match self {
            Epoch::Epoch1 => 1,
            Epoch::Epoch2 => 2,
            _ => 0,
        }
    }
}

/// Registered epoch upgrade links and their signers
#[derive(Default, Clone)]
pub struct Epochs {
    epochs: HashMap<Link, (PublicKey, Epoch)>,
}

impl Epochs {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, epoch: Epoch, signer: PublicKey, link: Link) {
        self.epochs.insert(link, (signer, epoch));
    }

    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.epochs.contains_key(link)
    }

    pub fn epoch(&self, link: &Link) -> Option<Epoch> {
        self.epochs.get(link).map(|(_, epoch)| *epoch)
    }

    pub fn signer(&self, epoch: Epoch) -> Option<&PublicKey> {
        self.epochs
            .values()
            .find(|(_, e)| *e == epoch)
            .map(|(signer, _)| signer)
    }

    pub fn link(&self, epoch: Epoch) -> Option<&Link> {
        self.epochs
            .iter()
            .find(|(_, (_, e))| *e == epoch)
            .map(|(link, _)| link)
    }

    pub fn validate_epoch_signature(&self, block: &crate::Block) -> anyhow::Result<()> {
        let link = block
            .link_field()
            .ok_or_else(|| anyhow!("block has no link"))?;
        let (signer, _) = self
            .epochs
            .get(&link)
            .ok_or_else(|| anyhow!("not an epoch link"))?;
        validate_message(signer, block.hash().as_bytes(), block.block_signature())
    }

    /// Checks that a valid epoch upgrade from `epoch` to `new_epoch` exists
    pub fn is_sequential(epoch: Epoch, new_epoch: Epoch) -> bool {
        let epoch_number = epoch as u8;
        if epoch < Epoch::Epoch0 || new_epoch < Epoch::Epoch1 {
            return false;
        }
        new_epoch as u8 == epoch_number + 1
    }
}

use once_cell::sync::Lazy;
use vanta_core::{
    work::{WorkPoolImpl, WorkThresholds},
    Account, Block, BlockHash, Epoch, Epochs, Link, OpenBlock, PrivateKey, PublicKey,
};

/// Well known private key of the dev network genesis account
pub static DEV_GENESIS_KEY: Lazy<PrivateKey> = Lazy::new(|| {
    PrivateKey::from_hex("34F0A37AAD20F4A260F0A5B3CB3D7FB50673212263E58A380BC10474BB039CE4").unwrap()
});

pub static DEV_GENESIS_PUB_KEY: Lazy<PublicKey> = Lazy::new(|| DEV_GENESIS_KEY.public_key());

pub static DEV_GENESIS_ACCOUNT: Lazy<Account> = Lazy::new(|| DEV_GENESIS_KEY.account());

pub static DEV_GENESIS_BLOCK: Lazy<Block> = Lazy::new(|| {
    let pool = WorkPoolImpl::new(WorkThresholds::publish_dev());
    let account = *DEV_GENESIS_ACCOUNT;
    Block::LegacyOpen(OpenBlock::new(
        BlockHash::from_bytes(*account.as_bytes()),
        *DEV_GENESIS_PUB_KEY,
        account,
        &DEV_GENESIS_KEY,
        pool.generate_dev(account),
    ))
});

pub static DEV_GENESIS_HASH: Lazy<BlockHash> = Lazy::new(|| DEV_GENESIS_BLOCK.hash());

pub static LEDGER_CONSTANTS_STUB: Lazy<LedgerConstants> = Lazy::new(LedgerConstants::dev);

fn epoch_link(epoch: Epoch) -> Link {
    // Epoch links carry a human readable marker followed by the version
    let mut bytes = [0u8; 32];
    let marker = b"epoch v";
    bytes[..marker.len()].copy_from_slice(marker);
    bytes[marker.len()] = b'0' + epoch.epoch_number();
    Link::from_bytes(bytes)
}

#[derive(Clone)]
pub struct LedgerConstants {
    pub work: WorkThresholds,
    pub genesis_block: Block,
    pub genesis_account: Account,
    pub genesis_amount: vanta_core::Amount,
    pub burn_account: Account,
    pub epochs: Epochs,
}

impl LedgerConstants {
    pub fn dev() -> Self {
        let genesis_account = *DEV_GENESIS_ACCOUNT;
        let mut epochs = Epochs::new();
        let signer = *DEV_GENESIS_PUB_KEY;
        epochs.add(Epoch::Epoch1, signer, epoch_link(Epoch::Epoch1));
        epochs.add(Epoch::Epoch2, signer, epoch_link(Epoch::Epoch2));

        Self {
            work: WorkThresholds::publish_dev(),
            genesis_block: DEV_GENESIS_BLOCK.clone(),
            genesis_account,
            genesis_amount: vanta_core::Amount::MAX,
            burn_account: Account::zero(),
            epochs,
        }
    }
}

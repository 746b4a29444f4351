use crate::{Ledger, DEV_GENESIS_KEY};
use once_cell::sync::Lazy;
use vanta_core::{
    work::{WorkPoolImpl, WorkThresholds},
    Account, Amount, Block, BlockHash, ChangeBlock, Epoch, Link, OpenBlock, PrivateKey, PublicKey,
    ReceiveBlock, SendBlock, StateBlock,
};
use vanta_store::Transaction;

pub(crate) static DEV_WORK_POOL: Lazy<WorkPoolImpl> =
    Lazy::new(|| WorkPoolImpl::new(WorkThresholds::publish_dev()));

/// Creates valid successor blocks for one account
pub(crate) struct AccountBlockFactory<'a> {
    pub key: PrivateKey,
    ledger: &'a Ledger,
}

impl<'a> AccountBlockFactory<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self {
            key: PrivateKey::new(),
            ledger,
        }
    }

    pub fn genesis(ledger: &'a Ledger) -> Self {
        Self {
            key: DEV_GENESIS_KEY.clone(),
            ledger,
        }
    }

    pub fn account(&self) -> Account {
        self.key.account()
    }

    fn info(&self, txn: &dyn Transaction) -> vanta_core::AccountInfo {
        self.ledger
            .any()
            .get_account(txn, &self.account())
            .expect("account not opened yet")
    }

    pub fn legacy_send(&self, txn: &dyn Transaction, destination: Account, amount: Amount) -> Block {
        let info = self.info(txn);
        Block::LegacySend(SendBlock::new(
            info.head,
            destination,
            info.balance - amount,
            &self.key,
            DEV_WORK_POOL.generate_dev(info.head),
        ))
    }

    pub fn legacy_open(&self, source: BlockHash) -> Block {
        Block::LegacyOpen(OpenBlock::new(
            source,
            self.key.public_key(),
            self.account(),
            &self.key,
            DEV_WORK_POOL.generate_dev(self.account()),
        ))
    }

    pub fn legacy_receive(&self, txn: &dyn Transaction, source: BlockHash) -> Block {
        let info = self.info(txn);
        Block::LegacyReceive(ReceiveBlock::new(
            info.head,
            source,
            &self.key,
            DEV_WORK_POOL.generate_dev(info.head),
        ))
    }

    pub fn legacy_change(&self, txn: &dyn Transaction, representative: PublicKey) -> Block {
        let info = self.info(txn);
        Block::LegacyChange(ChangeBlock::new(
            info.head,
            representative,
            &self.key,
            DEV_WORK_POOL.generate_dev(info.head),
        ))
    }

    pub fn send(&self, txn: &dyn Transaction, destination: Account, amount: Amount) -> Block {
        let info = self.info(txn);
        Block::State(StateBlock::new(
            self.account(),
            info.head,
            info.representative,
            info.balance - amount,
            destination.into(),
            &self.key,
            DEV_WORK_POOL.generate_dev(info.head),
        ))
    }

    pub fn open(&self, source: BlockHash, amount: Amount) -> Block {
        Block::State(StateBlock::new(
            self.account(),
            BlockHash::zero(),
            self.key.public_key(),
            amount,
            source.into(),
            &self.key,
            DEV_WORK_POOL.generate_dev(self.account()),
        ))
    }

    pub fn receive(&self, txn: &dyn Transaction, source: BlockHash, amount: Amount) -> Block {
        let info = self.info(txn);
        Block::State(StateBlock::new(
            self.account(),
            info.head,
            info.representative,
            info.balance + amount,
            source.into(),
            &self.key,
            DEV_WORK_POOL.generate_dev(info.head),
        ))
    }

    pub fn change(&self, txn: &dyn Transaction, representative: PublicKey) -> Block {
        let info = self.info(txn);
        Block::State(StateBlock::new(
            self.account(),
            info.head,
            representative,
            info.balance,
            Link::zero(),
            &self.key,
            DEV_WORK_POOL.generate_dev(info.head),
        ))
    }

    /// Epoch upgrade, signed by the epoch signer rather than the account key
    pub fn epoch(&self, txn: &dyn Transaction, epoch: Epoch) -> Block {
        let info = self.info(txn);
        let link = *self.ledger.constants.epochs.link(epoch).unwrap();
        Block::State(StateBlock::new(
            self.account(),
            info.head,
            info.representative,
            info.balance,
            link,
            &DEV_GENESIS_KEY,
            DEV_WORK_POOL.generate_dev(info.head),
        ))
    }

    /// Epoch open for an account that has receivables but no blocks yet
    pub fn epoch_open(&self, epoch: Epoch) -> Block {
        let link = *self.ledger.constants.epochs.link(epoch).unwrap();
        Block::State(StateBlock::new(
            self.account(),
            BlockHash::zero(),
            PublicKey::zero(),
            Amount::zero(),
            link,
            &DEV_GENESIS_KEY,
            DEV_WORK_POOL.generate_dev(self.account()),
        ))
    }
}

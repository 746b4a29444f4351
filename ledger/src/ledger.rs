use crate::{
    block_cementer::BlockCementer,
    block_insertion::{BlockInserter, BlockValidatorFactory},
    block_rollback::BlockRollbackPerformer,
    BlockStatus, DependentBlocksFinder, LedgerConstants, LedgerSetAny, LedgerSetConfirmed,
    RepWeightCache, WriteQueue,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};
use tracing::debug;
use vanta_core::{
    utils::seconds_since_epoch, Account, Amount, Block, BlockDetails, BlockHash, BlockSideband,
    ConfirmationHeightInfo, Epoch, Link, PublicKey, Root, SavedBlock,
};
use vanta_store::{ReadTransaction, Store, WriteTransaction};

pub(crate) struct LedgerCache {
    pub block_count: AtomicU64,
    pub cemented_count: AtomicU64,
    pub account_count: AtomicU64,
    pub epoch_2_started: AtomicBool,
}

impl LedgerCache {
    fn new() -> Self {
        Self {
            block_count: AtomicU64::new(0),
            cemented_count: AtomicU64::new(0),
            account_count: AtomicU64::new(0),
            epoch_2_started: AtomicBool::new(false),
        }
    }
}

type Epoch2Callback = Box<dyn Fn() + Send + Sync>;

/// Validates and applies blocks under a single writer, maintains account
/// state, representative weights, receivables and the cemented frontier.
pub struct Ledger {
    pub store: Store,
    pub constants: LedgerConstants,
    pub rep_weights: Arc<RepWeightCache>,
    pub write_queue: Arc<WriteQueue>,
    pub(crate) cache: LedgerCache,
    bootstrap_weights: HashMap<PublicKey, Amount>,
    bootstrap_weight_max_blocks: u64,
    epoch_2_observers: Mutex<Vec<Epoch2Callback>>,
}

impl Ledger {
    pub fn new(store: Store, constants: LedgerConstants) -> anyhow::Result<Self> {
        Self::with_bootstrap_weights(store, constants, HashMap::new(), 0)
    }

    /// `bootstrap_weights` are returned from weight queries while fewer than
    /// `bootstrap_weight_max_blocks` blocks are in the ledger.
    pub fn with_bootstrap_weights(
        store: Store,
        constants: LedgerConstants,
        bootstrap_weights: HashMap<PublicKey, Amount>,
        bootstrap_weight_max_blocks: u64,
    ) -> anyhow::Result<Self> {
        let ledger = Self {
            store,
            constants,
            rep_weights: Arc::new(RepWeightCache::new()),
            write_queue: Arc::new(WriteQueue::new()),
            cache: LedgerCache::new(),
            bootstrap_weights,
            bootstrap_weight_max_blocks,
            epoch_2_observers: Mutex::new(Vec::new()),
        };
        ledger.initialize()?;
        Ok(ledger)
    }

    fn initialize(&self) -> anyhow::Result<()> {
        let mut txn = self.store.tx_begin_write();
        if self.store.block.count(&txn) == 0 {
            self.insert_genesis(&mut txn);
        }

        if !self
            .store
            .block
            .exists(&txn, &self.constants.genesis_block.hash())
        {
            bail!("genesis block not found in store, refusing to start");
        }

        self.rebuild_cache(&txn);
        Ok(())
    }

    fn insert_genesis(&self, txn: &mut WriteTransaction) {
        let genesis = &self.constants.genesis_block;
        let account = self.constants.genesis_account;
        let sideband = BlockSideband::new(
            account,
            BlockHash::zero(),
            self.constants.genesis_amount,
            1,
            seconds_since_epoch(),
            BlockDetails::new(Epoch::Epoch0, false, false, false),
            Epoch::Epoch0,
        );
        let saved = SavedBlock::new(genesis.clone(), sideband.clone());
        self.store.block.put(txn, &saved);
        self.store.account.put(
            txn,
            &account,
            &vanta_core::AccountInfo {
                head: genesis.hash(),
                representative: account.into(),
                open_block: genesis.hash(),
                balance: self.constants.genesis_amount,
                modified: sideband.timestamp,
                block_count: 1,
                epoch: Epoch::Epoch0,
            },
        );
        if genesis.is_legacy() {
            self.store.frontier.put(txn, &genesis.hash(), &account);
        }
        // Genesis starts out cemented
        self.store.confirmation_height.put(
            txn,
            &account,
            &ConfirmationHeightInfo::new(1, genesis.hash()),
        );
    }

    fn rebuild_cache(&self, txn: &WriteTransaction) {
        self.cache
            .block_count
            .store(self.store.block.count(txn), Ordering::SeqCst);
        self.cache
            .account_count
            .store(self.store.account.count(txn), Ordering::SeqCst);

        let mut cemented = 0;
        let mut epoch_2 = false;
        for (account, info) in self.store.account.iter(txn) {
            cemented += self
                .store
                .confirmation_height
                .get(txn, &account)
                .map(|i| i.height)
                .unwrap_or_default();
            if info.epoch == Epoch::Epoch2 {
                epoch_2 = true;
            }
            self.rep_weights
                .representation_add(info.representative, info.balance);
        }
        self.cache.cemented_count.store(cemented, Ordering::SeqCst);
        self.cache.epoch_2_started.store(epoch_2, Ordering::SeqCst);
    }

    pub fn read_txn(&self) -> ReadTransaction {
        self.store.tx_begin_read()
    }

    pub fn rw_txn(&self) -> WriteTransaction {
        self.store.tx_begin_write()
    }

    /// Read view over every block in the ledger
    pub fn any(&self) -> LedgerSetAny<'_> {
        LedgerSetAny::new(&self.store)
    }

    /// Read view restricted to cemented blocks
    pub fn confirmed(&self) -> LedgerSetConfirmed<'_> {
        LedgerSetConfirmed::new(&self.store)
    }

    /// Voting weight delegated to a representative. Until the ledger has
    /// caught up with the network, the externally supplied bootstrap table
    /// is authoritative.
    pub fn weight(&self, representative: &PublicKey) -> Amount {
        if self.block_count() < self.bootstrap_weight_max_blocks {
            if let Some(weight) = self.bootstrap_weights.get(representative) {
                return *weight;
            }
        }
        self.rep_weights.weight(representative)
    }

    pub fn bootstrap_weight_max_blocks(&self) -> u64 {
        self.bootstrap_weight_max_blocks
    }

    pub fn bootstrap_weights(&self) -> &HashMap<PublicKey, Amount> {
        &self.bootstrap_weights
    }

    pub fn block_count(&self) -> u64 {
        self.cache.block_count.load(Ordering::SeqCst)
    }

    pub fn cemented_count(&self) -> u64 {
        self.cache.cemented_count.load(Ordering::SeqCst)
    }

    pub fn account_count(&self) -> u64 {
        self.cache.account_count.load(Ordering::SeqCst)
    }

    pub fn epoch_2_started(&self) -> bool {
        self.cache.epoch_2_started.load(Ordering::SeqCst)
    }

    /// Fires exactly once, when the first epoch 2 artifact is applied
    pub fn on_epoch_2_started(&self, callback: Epoch2Callback) {
        self.epoch_2_observers.lock().unwrap().push(callback);
    }

    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.constants.epochs.is_epoch_link(link)
    }

    /// Validates and applies a block. On success the stored block with its
    /// computed sideband is returned.
    pub fn process(
        &self,
        txn: &mut WriteTransaction,
        block: &Block,
    ) -> Result<SavedBlock, BlockStatus> {
        let validator = BlockValidatorFactory::new(self, txn, block).create_validator();
        let instructions = validator.validate()?;
        let saved = BlockInserter::new(self, txn, block, &instructions).insert();

        if saved.epoch() == Epoch::Epoch2 || saved.source_epoch() == Epoch::Epoch2 {
            self.mark_epoch_2_started();
        }

        Ok(saved)
    }

    fn mark_epoch_2_started(&self) {
        if !self.cache.epoch_2_started.swap(true, Ordering::SeqCst) {
            debug!("First epoch 2 block observed");
            let observers = self.epoch_2_observers.lock().unwrap();
            for observer in observers.iter() {
                observer();
            }
        }
    }

    /// Replaces a stored block with another representation of the same
    /// content, used when a higher work version of a block arrives.
    pub fn update_block(&self, txn: &mut WriteTransaction, block: &Block) -> bool {
        let Some(existing) = self.any().get_block(txn, &block.hash()) else {
            return false;
        };
        let saved = SavedBlock::new(block.clone(), existing.sideband.clone());
        self.store.block.put(txn, &saved);
        true
    }

    /// Rolls back all blocks from the account head down to and including
    /// `block_hash`. Cemented blocks cannot be rolled back.
    pub fn rollback(
        &self,
        txn: &mut WriteTransaction,
        block_hash: &BlockHash,
    ) -> anyhow::Result<Vec<SavedBlock>> {
        BlockRollbackPerformer::new(self, txn).roll_back(block_hash)
    }

    /// Cements `target_hash` together with all its uncemented dependencies,
    /// dependencies first. Returns the newly cemented blocks in order.
    pub fn confirm(&self, txn: &mut WriteTransaction, target_hash: BlockHash) -> Vec<SavedBlock> {
        self.confirm_max(txn, target_hash, 1024 * 128)
    }

    pub fn confirm_max(
        &self,
        txn: &mut WriteTransaction,
        target_hash: BlockHash,
        max_blocks: usize,
    ) -> Vec<SavedBlock> {
        BlockCementer::new(self).confirm(txn, target_hash, max_blocks)
    }

    /// True if every dependency of the block is already cemented
    pub fn dependents_confirmed(
        &self,
        txn: &dyn vanta_store::Transaction,
        block: &SavedBlock,
    ) -> bool {
        DependentBlocksFinder::new(self, txn)
            .find_dependent_blocks(block)
            .iter()
            .all(|hash| self.confirmed().block_exists(txn, hash))
    }

    /// The root a new block on this account must use for proof of work
    pub fn latest_root(&self, txn: &dyn vanta_store::Transaction, account: &Account) -> Root {
        match self.any().account_head(txn, account) {
            Some(head) => head.into(),
            None => (*account).into(),
        }
    }
}

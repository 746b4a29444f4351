mod account_store;
mod block_store;
mod confirmation_height_store;
mod frontier_store;
mod online_weight_store;
mod peer_store;
mod pending_store;
mod transaction;
mod unchecked_store;
mod vote_store;

pub use account_store::AccountStore;
pub use block_store::BlockStore;
pub use confirmation_height_store::ConfirmationHeightStore;
pub use frontier_store::FrontierStore;
pub use online_weight_store::OnlineWeightStore;
pub use peer_store::PeerStore;
pub use pending_store::PendingStore;
pub use transaction::{ReadTransaction, Transaction, WriteTransaction};
pub use unchecked_store::UncheckedStore;
pub use vote_store::VoteStore;

/// The set of tables the consensus core persists. Rows are atomic and
/// writers are expected to be serialized externally (the ledger write
/// queue); readers observe row level snapshots.
#[derive(Clone, Default)]
pub struct Store {
    pub block: BlockStore,
    pub account: AccountStore,
    pub pending: PendingStore,
    pub frontier: FrontierStore,
    pub confirmation_height: ConfirmationHeightStore,
    pub online_weight: OnlineWeightStore,
    pub peer: PeerStore,
    pub unchecked: UncheckedStore,
    pub vote: VoteStore,
}

impl Store {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn tx_begin_read(&self) -> ReadTransaction {
        ReadTransaction::new()
    }

    pub fn tx_begin_write(&self) -> WriteTransaction {
        WriteTransaction::new()
    }
}

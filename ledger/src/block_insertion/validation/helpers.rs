use super::BlockValidator;
use vanta_core::{
    AccountInfo, Amount, Block, BlockDetails, BlockHash, BlockSideband, Epoch, PendingInfo,
    PendingKey, PublicKey, StateBlock,
};

impl<'a> BlockValidator<'a> {
    pub(crate) fn account_exists(&self) -> bool {
        self.old_account_info.is_some()
    }

    pub(crate) fn is_new_account(&self) -> bool {
        self.old_account_info.is_none()
    }

    pub(crate) fn previous_balance(&self) -> Amount {
        self.previous_block
            .as_ref()
            .map(|b| b.balance())
            .unwrap_or_default()
    }

    pub(crate) fn is_send(&self) -> bool {
        match self.block {
            Block::LegacySend(_) => true,
            Block::State(state) => match &self.old_account_info {
                Some(info) => state.balance < info.balance,
                None => false,
            },
            _ => false,
        }
    }

    pub(crate) fn is_receive(&self) -> bool {
        match self.block {
            Block::LegacyReceive(_) | Block::LegacyOpen(_) => true,
            Block::State(state) => {
                // receives from the epoch account are forbidden
                if self.has_epoch_link(state) {
                    return false;
                }

                match &self.old_account_info {
                    Some(info) => state.balance >= info.balance && !state.link.is_zero(),
                    None => true,
                }
            }
            _ => false,
        }
    }

    pub(crate) fn source_epoch(&self) -> Epoch {
        self.pending_receive_info
            .as_ref()
            .map(|p| p.epoch)
            .unwrap_or(Epoch::Epoch0)
    }

    pub(crate) fn amount_received(&self) -> Amount {
        match &self.block {
            Block::LegacyReceive(_) | Block::LegacyOpen(_) => self
                .pending_receive_info
                .as_ref()
                .map(|i| i.amount)
                .unwrap_or_default(),
            Block::State(state) => {
                let previous = self.previous_balance();
                if previous < state.balance {
                    state.balance - previous
                } else {
                    Amount::zero()
                }
            }
            _ => Amount::zero(),
        }
    }

    pub(crate) fn amount_sent(&self) -> Amount {
        if let Some(info) = &self.old_account_info {
            if let Some(balance) = self.block.balance_field() {
                if balance < info.balance {
                    return info.balance - balance;
                }
            }
        }
        Amount::zero()
    }

    /// Amount moved by this block, in either direction
    pub(crate) fn amount(&self) -> Amount {
        let old_balance = self
            .old_account_info
            .as_ref()
            .map(|x| x.balance)
            .unwrap_or_default();
        let new_balance = self.new_balance();

        if old_balance > new_balance {
            old_balance - new_balance
        } else {
            new_balance - old_balance
        }
    }

    pub(crate) fn new_balance(&self) -> Amount {
        self.old_account_info
            .as_ref()
            .map(|i| i.balance)
            .unwrap_or_default()
            + self.amount_received()
            - self.amount_sent()
    }

    pub(crate) fn balance_changed(&self) -> bool {
        if let Some(info) = &self.old_account_info {
            self.new_balance() != info.balance
        } else {
            false
        }
    }

    pub(crate) fn has_epoch_link(&self, state_block: &StateBlock) -> bool {
        self.epochs.is_epoch_link(&state_block.link)
    }

    /// Only conclusive once the previous block was loaded, because the
    /// balance change check needs it
    pub(crate) fn is_epoch_block(&self) -> bool {
        match self.block {
            Block::State(state_block) => {
                self.has_epoch_link(state_block) && self.previous_balance() == state_block.balance
            }
            _ => false,
        }
    }

    pub(crate) fn block_epoch_version(&self) -> Epoch {
        match self.block {
            Block::State(state) => self.epochs.epoch(&state.link).unwrap_or(Epoch::Invalid),
            _ => Epoch::Epoch0,
        }
    }

    pub(crate) fn epoch(&self) -> Epoch {
        if self.is_epoch_block() {
            self.block_epoch_version()
        } else {
            let epoch = self
                .old_account_info
                .as_ref()
                .map(|i| i.epoch)
                .unwrap_or(Epoch::Epoch0);
            std::cmp::max(epoch, self.source_epoch())
        }
    }

    pub(crate) fn open_block(&self) -> BlockHash {
        match &self.old_account_info {
            Some(info) => info.open_block,
            None => self.block.hash(),
        }
    }

    pub(crate) fn new_representative(&self) -> PublicKey {
        self.block.representative_field().unwrap_or(
            self.old_account_info
                .as_ref()
                .map(|x| x.representative)
                .unwrap_or_default(),
        )
    }

    pub(crate) fn new_block_count(&self) -> u64 {
        self.old_account_info
            .as_ref()
            .map(|info| info.block_count)
            .unwrap_or_default()
            + 1
    }

    pub(crate) fn block_details(&self) -> BlockDetails {
        BlockDetails::new(
            self.epoch(),
            self.is_send(),
            self.is_receive(),
            self.is_epoch_block(),
        )
    }

    pub(crate) fn new_pending_info(&self) -> Option<(PendingKey, PendingInfo)> {
        match self.block {
            Block::State(state) => {
                if self.is_send() {
                    let key = PendingKey::new(state.link.into(), state.hash());
                    let info = PendingInfo::new(self.account, self.amount(), self.epoch());
                    Some((key, info))
                } else {
                    None
                }
            }
            Block::LegacySend(send) => Some((
                PendingKey::new(send.destination, send.hash()),
                PendingInfo::new(self.account, self.amount_sent(), Epoch::Epoch0),
            )),
            _ => None,
        }
    }

    pub(crate) fn get_pending_receive_key(&self) -> Option<PendingKey> {
        match &self.block {
            Block::State(state) => {
                if self.is_receive() {
                    Some(PendingKey::new(self.account, state.link.into()))
                } else {
                    None
                }
            }
            Block::LegacyOpen(open) => Some(PendingKey::new(self.account, open.source)),
            Block::LegacyReceive(receive) => Some(PendingKey::new(self.account, receive.source)),
            _ => None,
        }
    }

    pub(crate) fn delete_received_pending_info(&self) -> Option<PendingKey> {
        if self.pending_receive_info.is_some() {
            self.get_pending_receive_key()
        } else {
            None
        }
    }

    pub(crate) fn new_sideband(&self) -> BlockSideband {
        BlockSideband::new(
            self.account,
            BlockHash::zero(),
            self.new_balance(),
            self.new_block_count(),
            self.seconds_since_epoch,
            self.block_details(),
            self.source_epoch(),
        )
    }

    pub(crate) fn new_account_info(&self) -> AccountInfo {
        AccountInfo {
            head: self.block.hash(),
            representative: self.new_representative(),
            open_block: self.open_block(),
            balance: self.new_balance(),
            modified: self.seconds_since_epoch,
            block_count: self.new_block_count(),
            epoch: self.epoch(),
        }
    }
}

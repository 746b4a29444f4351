use super::BlockValidator;
use crate::BlockStatus;
use vanta_core::Block;

impl<'a> BlockValidator<'a> {
    pub(crate) fn ensure_no_double_account_open(&self) -> Result<(), BlockStatus> {
        if self.account_exists() && self.block.is_open() {
            Err(BlockStatus::Fork)
        } else {
            Ok(())
        }
    }

    /// A state open block must either receive or be an epoch upgrade
    pub(crate) fn ensure_open_block_has_link(&self) -> Result<(), BlockStatus> {
        if let Block::State(state) = self.block {
            if self.block.is_open() && state.link.is_zero() && !self.is_epoch_block() {
                return Err(BlockStatus::GapSource);
            }
        }
        Ok(())
    }

    /// A balance increase without a link has nothing to receive from
    pub(crate) fn ensure_no_receive_balance_change_without_link(&self) -> Result<(), BlockStatus> {
        if let Block::State(state) = self.block {
            if !self.block.is_open() && state.link.is_zero() {
                if let Some(info) = &self.old_account_info {
                    if state.balance > info.balance {
                        return Err(BlockStatus::BalanceMismatch);
                    }
                }
            }
        }
        Ok(())
    }
}

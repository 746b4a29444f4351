use super::BlockValidator;
use crate::BlockStatus;
use vanta_core::Block;

impl<'a> BlockValidator<'a> {
    pub(crate) fn ensure_no_negative_amount_send(&self) -> Result<(), BlockStatus> {
        // A legacy send must declare a balance strictly below its predecessor
        if let Block::LegacySend(send) = self.block {
            if let Some(info) = &self.old_account_info {
                if send.balance >= info.balance {
                    return Err(BlockStatus::NegativeSpend);
                }
            }
        }

        Ok(())
    }
}

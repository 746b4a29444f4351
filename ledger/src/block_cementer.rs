use crate::{DependentBlocksFinder, Ledger};
use std::{collections::VecDeque, sync::atomic::Ordering};
use vanta_core::{BlockHash, ConfirmationHeightInfo, SavedBlock};
use vanta_store::WriteTransaction;

/// Cements blocks in the ledger, dependencies first. For a receive this
/// means the sending chain is cemented before the receiving block.
pub(crate) struct BlockCementer<'a> {
    ledger: &'a Ledger,
}

impl<'a> BlockCementer<'a> {
    pub(crate) fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    pub(crate) fn confirm(
        &self,
        txn: &mut WriteTransaction,
        target_hash: BlockHash,
        max_blocks: usize,
    ) -> Vec<SavedBlock> {
        let mut result = Vec::new();

        let mut stack = VecDeque::new();
        stack.push_back(target_hash);
        while let Some(&hash) = stack.back() {
            let Some(block) = self.ledger.any().get_block(txn, &hash) else {
                // The block was rolled back while cementing
                break;
            };

            let dependents =
                DependentBlocksFinder::new(self.ledger, txn).find_dependent_blocks(&block);
            for dependent in dependents.iter() {
                if !self.ledger.confirmed().block_exists(txn, dependent) {
                    stack.push_back(*dependent);

                    // Limit the stack size to avoid excessive memory usage
                    // This will forget the bottom of the dependency tree
                    if stack.len() > max_blocks {
                        stack.pop_front();
                    }
                }
            }

            if stack.back() == Some(&hash) {
                stack.pop_back();
                if !self.ledger.confirmed().block_exists(txn, &hash) {
                    // Only blocks with all dependencies confirmed may be cemented
                    let conf_height = ConfirmationHeightInfo::new(block.height(), block.hash());
                    self.ledger
                        .store
                        .confirmation_height
                        .put(txn, &block.account(), &conf_height);
                    self.ledger
                        .cache
                        .cemented_count
                        .fetch_add(1, Ordering::SeqCst);

                    result.push(block);
                }
            }

            // An early return leaves parts of the dependency tree unconfirmed
            if result.len() >= max_blocks {
                break;
            }
        }
        result
    }
}

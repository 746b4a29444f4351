use std::sync::{Arc, Mutex};
use vanta_core::{
    work::WorkPoolImpl, Account, Amount, Block, PrivateKey, PublicKey, StateBlock,
};
use vanta_ledger::Ledger;

/// Holds the keys of local voting representatives and creates local sends.
/// Key storage, encryption and the wallet UX live outside the consensus
/// core; only the signing surface is provided here.
pub struct Wallets {
    ledger: Arc<Ledger>,
    work_pool: Arc<WorkPoolImpl>,
    representatives: Mutex<Vec<PrivateKey>>,
}

impl Wallets {
    pub fn new(ledger: Arc<Ledger>, work_pool: Arc<WorkPoolImpl>) -> Self {
        Self {
            ledger,
            work_pool,
            representatives: Mutex::new(Vec::new()),
        }
    }

    /// Registers a key as a local voting representative
    pub fn insert(&self, key: PrivateKey) {
        let mut guard = self.representatives.lock().unwrap();
        if !guard
            .iter()
            .any(|existing| existing.public_key() == key.public_key())
        {
            guard.push(key);
        }
    }

    pub fn voting_reps_count(&self) -> usize {
        self.representatives.lock().unwrap().len()
    }

    pub fn rep_exists(&self, representative: &PublicKey) -> bool {
        self.representatives
            .lock()
            .unwrap()
            .iter()
            .any(|key| key.public_key() == *representative)
    }

    pub fn foreach_representative(&self, mut action: impl FnMut(&PrivateKey)) {
        let keys: Vec<PrivateKey> = self
            .representatives
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .collect();
        for key in &keys {
            action(key);
        }
    }

    /// Creates a signed send from a local account. The caller processes it
    /// with local origin, which makes its election non droppable.
    pub fn send_action(
        &self,
        key: &PrivateKey,
        destination: Account,
        amount: Amount,
    ) -> anyhow::Result<Block> {
        let txn = self.ledger.read_txn();
        let info = self
            .ledger
            .any()
            .get_account(&txn, &key.account())
            .ok_or_else(|| anyhow!("wallet account not opened"))?;
        if info.balance < amount {
            bail!("insufficient balance");
        }

        let work = self
            .work_pool
            .generate(info.head, self.ledger.constants.work.base)
            .ok_or_else(|| anyhow!("work generation cancelled"))?;

        Ok(Block::State(StateBlock::new(
            key.account(),
            info.head,
            info.representative,
            info.balance - amount,
            destination.into(),
            key,
            work,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanta_core::work::WorkThresholds;
    use vanta_ledger::{LedgerContext, DEV_GENESIS_KEY};

    fn test_wallets() -> (LedgerContext, Wallets) {
        let ctx = LedgerContext::empty();
        let wallets = Wallets::new(
            Arc::clone(&ctx.ledger),
            Arc::new(WorkPoolImpl::new(WorkThresholds::publish_dev())),
        );
        (ctx, wallets)
    }

    #[test]
    fn insert_is_idempotent() {
        let (_ctx, wallets) = test_wallets();
        let key = PrivateKey::from(1);
        wallets.insert(key.clone());
        wallets.insert(key.clone());
        assert_eq!(wallets.voting_reps_count(), 1);
        assert!(wallets.rep_exists(&key.public_key()));
    }

    #[test]
    fn send_action_creates_valid_block() {
        let (ctx, wallets) = test_wallets();
        wallets.insert(DEV_GENESIS_KEY.clone());

        let destination = PrivateKey::new().account();
        let send = wallets
            .send_action(&DEV_GENESIS_KEY, destination, Amount::vanta(5))
            .unwrap();

        let mut txn = ctx.ledger.rw_txn();
        let saved = ctx.ledger.process(&mut txn, &send).unwrap();
        assert!(saved.is_send());
        assert_eq!(saved.balance(), Amount::MAX - Amount::vanta(5));
    }

    #[test]
    fn send_action_rejects_overdraw() {
        let (_ctx, wallets) = test_wallets();
        let result = wallets.send_action(
            &PrivateKey::new(),
            PrivateKey::new().account(),
            Amount::vanta(1),
        );
        assert!(result.is_err());
    }
}

use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard},
};
use vanta_core::{Amount, PublicKey};

/// In-memory voting weight per representative. Only the ledger writer
/// mutates it; consumers read through the shared cache.
#[derive(Default)]
pub struct RepWeightCache {
    weights: RwLock<HashMap<PublicKey, Amount>>,
}

impl RepWeightCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn weight(&self, representative: &PublicKey) -> Amount {
        self.weights
            .read()
            .unwrap()
            .get(representative)
            .copied()
            .unwrap_or_default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, HashMap<PublicKey, Amount>> {
        self.weights.read().unwrap()
    }

    pub fn len(&self) -> usize {
        self.weights.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds `amount` to a representative. The amount may be the two's
    /// complement of a subtraction, additions wrap.
    pub fn representation_add(&self, representative: PublicKey, amount: Amount) {
        let mut weights = self.weights.write().unwrap();
        Self::add_impl(&mut weights, representative, amount);
    }

    /// Applies two weight changes atomically, used when a block moves an
    /// account's balance from one representative to another.
    pub fn representation_add_dual(
        &self,
        rep_1: PublicKey,
        amount_1: Amount,
        rep_2: PublicKey,
        amount_2: Amount,
    ) {
        let mut weights = self.weights.write().unwrap();
        Self::add_impl(&mut weights, rep_1, amount_1);
        Self::add_impl(&mut weights, rep_2, amount_2);
    }

    fn add_impl(weights: &mut HashMap<PublicKey, Amount>, rep: PublicKey, amount: Amount) {
        let entry = weights.entry(rep).or_insert(Amount::zero());
        *entry = entry.wrapping_add(amount);
        if entry.is_zero() {
            weights.remove(&rep);
        }
    }
}

use primitive_types::U256;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use vanta_core::{Amount, PublicKey};
use vanta_ledger::Ledger;

pub const ONLINE_WEIGHT_QUORUM: u8 = 67;

/// Tracks representatives observed voting since the last sampling period and
/// derives the confirmation quorum from the trended online stake.
pub struct OnlineReps {
    ledger: Arc<Ledger>,
    reps: HashMap<PublicKey, Instant>,
    online_weight: Amount,
    trended_weight: Amount,
    weight_period: Duration,
    online_weight_minimum: Amount,
}

impl OnlineReps {
    pub fn new(
        ledger: Arc<Ledger>,
        weight_period: Duration,
        online_weight_minimum: Amount,
    ) -> Self {
        Self {
            ledger,
            reps: HashMap::new(),
            online_weight: Amount::zero(),
            trended_weight: Amount::zero(),
            weight_period,
            online_weight_minimum,
        }
    }

    /// Adds a voting representative to the set of online representatives
    pub fn observe(&mut self, representative: PublicKey) {
        if self.ledger.weight(&representative) > Amount::zero() {
            let now = Instant::now();
            let new_insert = self.reps.insert(representative, now).is_none();
            let trimmed = self.trim(now);
            if new_insert || trimmed {
                self.calculate_online_weight();
            }
        }
    }

    fn trim(&mut self, now: Instant) -> bool {
        let cutoff = self.weight_period;
        let before = self.reps.len();
        self.reps
            .retain(|_, observed| now.saturating_duration_since(*observed) < cutoff);
        before != self.reps.len()
    }

    fn calculate_online_weight(&mut self) {
        let mut current = Amount::zero();
        for representative in self.reps.keys() {
            current += self.ledger.weight(representative);
        }
        self.online_weight = current;
    }

    /// Aggregate weight of the representatives seen voting this period
    pub fn online_weight(&self) -> Amount {
        self.online_weight
    }

    pub fn online_weight_minimum(&self) -> Amount {
        self.online_weight_minimum
    }

    pub fn set_trended(&mut self, trended: Amount) {
        self.trended_weight = trended;
    }

    /// Trended online stake, never below the configured minimum
    pub fn online_stake(&self) -> Amount {
        std::cmp::max(self.trended_weight, self.online_weight_minimum)
    }

    /// Minimum tally lead required to confirm an election
    pub fn delta(&self) -> Amount {
        // A larger intermediate ensures full precision
        let weight = U256::from(self.online_stake().number());
        let delta = weight * U256::from(ONLINE_WEIGHT_QUORUM) / U256::from(100);
        Amount::raw(delta.as_u128())
    }

    /// 0.1% of online stake; votes from smaller representatives are not
    /// worth processing individually
    pub fn minimum_principal_weight(&self) -> Amount {
        self.online_stake() / 1000
    }

    pub fn list(&self) -> Vec<PublicKey> {
        self.reps.keys().copied().collect()
    }

    pub fn count(&self) -> usize {
        self.reps.len()
    }

    /// Clears the observation set for the next sampling period
    pub fn clear(&mut self) {
        self.reps.clear();
        self.online_weight = Amount::zero();
    }
}

use std::sync::Arc;
use vanta_core::{utils::nanoseconds_since_epoch, Amount};
use vanta_ledger::Ledger;

/// Persists periodic online weight samples and derives the trend as the
/// mean of the largest samples inside the trend window.
pub struct OnlineWeightSampler {
    ledger: Arc<Ledger>,
    max_samples: u64,
    trend_window: usize,
}

impl OnlineWeightSampler {
    pub fn new(ledger: Arc<Ledger>, max_samples: u64, trend_window: usize) -> Self {
        Self {
            ledger,
            max_samples,
            trend_window,
        }
    }

    /// Called every weight period with the currently observed online weight
    pub fn sample(&self, current_online_weight: Amount) {
        let mut txn = self.ledger.rw_txn();
        // Drop the oldest samples to keep the history bounded
        while self.ledger.store.online_weight.count(&txn) >= self.max_samples {
            let oldest = self.ledger.store.online_weight.oldest(&txn).unwrap();
            self.ledger.store.online_weight.del(&mut txn, oldest);
        }
        self.ledger.store.online_weight.put(
            &mut txn,
            nanoseconds_since_epoch(),
            &current_online_weight,
        );
    }

    pub fn calculate_trend(&self) -> Amount {
        let txn = self.ledger.read_txn();
        let mut samples: Vec<Amount> = self
            .ledger
            .store
            .online_weight
            .iter(&txn)
            .into_iter()
            .map(|(_, amount)| amount)
            .collect();

        if samples.is_empty() {
            return Amount::zero();
        }

        // Trimmed mean over the top of the sample distribution
        samples.sort_unstable_by(|a, b| b.cmp(a));
        samples.truncate(self.trend_window);
        let sum: u128 = samples.iter().map(|amount| amount.number()).sum();
        Amount::raw(sum / samples.len() as u128)
    }
}

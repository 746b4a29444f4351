use super::{DifficultyV1, WorkThresholds, WorkVersion};
use crate::Root;
use rand::Rng;
use std::{collections::HashSet, sync::Mutex};

/// Brute force nonce search. Production deployments attach accelerated
/// generators; this pool is sufficient for dev thresholds.
pub struct WorkPoolImpl {
    thresholds: WorkThresholds,
    cancelled: Mutex<HashSet<Root>>,
}

impl WorkPoolImpl {
    pub fn new(thresholds: WorkThresholds) -> Self {
        Self {
            thresholds,
            cancelled: Mutex::new(HashSet::new()),
        }
    }

    pub fn threshold(&self, work_version: WorkVersion, details: &crate::BlockDetails) -> u64 {
        self.thresholds.threshold2(work_version, details)
    }

    /// Aborts an in-flight generation for `root`
    pub fn cancel(&self, root: &Root) {
        self.cancelled.lock().unwrap().insert(*root);
    }

    pub fn generate(&self, root: impl Into<Root>, threshold: u64) -> Option<u64> {
        let root = root.into();
        self.cancelled.lock().unwrap().remove(&root);
        let mut rng = rand::thread_rng();
        let mut nonce: u64 = rng.gen();
        let mut iterations = 0u32;
        loop {
            if DifficultyV1::get_difficulty(&root, nonce) >= threshold {
                return Some(nonce);
            }
            nonce = nonce.wrapping_add(1);
            iterations += 1;
            // Check for cancellation once in a while
            if iterations % 4096 == 0 && self.cancelled.lock().unwrap().remove(&root) {
                return None;
            }
        }
    }

    /// Generates work valid for every subtype under the configured thresholds
    pub fn generate_dev(&self, root: impl Into<Root>) -> u64 {
        self.generate(root, self.thresholds.base).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_work_meets_threshold() {
        let thresholds = WorkThresholds::publish_dev();
        let pool = WorkPoolImpl::new(thresholds.clone());
        let root = Root::from(123);
        let work = pool.generate_dev(root);
        assert!(DifficultyV1::get_difficulty(&root, work) >= thresholds.base);
    }

    #[test]
    fn cancel_marks_root() {
        let pool = WorkPoolImpl::new(WorkThresholds::publish_dev());
        pool.cancel(&Root::from(1));
        // A subsequent generation for the same root starts fresh
        assert!(pool.generate(Root::from(1), 0).is_some());
    }
}

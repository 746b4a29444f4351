mod work_pool;
mod work_thresholds;

pub use work_pool::WorkPoolImpl;
pub use work_thresholds::{WorkThresholds, WORK_THRESHOLDS_STUB};

use crate::Root;
use blake2::{
    digest::{Update, VariableOutput},
    Blake2bVar,
};

#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum WorkVersion {
    Unspecified = 0,
    Work1 = 1,
}

/// Version 1 proof of work: an 8 byte blake2b digest over the little endian
/// nonce followed by the work root. Higher digest value means more work.
pub struct DifficultyV1 {}

impl DifficultyV1 {
    pub fn get_difficulty(root: &Root, work: u64) -> u64 {
        let mut hasher = Blake2bVar::new(8).unwrap();
        hasher.update(&work.to_le_bytes());
        hasher.update(root.as_bytes());
        let mut out = [0u8; 8];
        hasher.finalize_variable(&mut out).unwrap();
        u64::from_le_bytes(out)
    }

    /// Relative difficulty compared to a base threshold. A multiplier of 2
    /// means the work is twice as hard to find as the base.
    pub fn to_multiplier(difficulty: u64, base: u64) -> f64 {
        debug_assert!(difficulty > 0);
        base.wrapping_neg() as f64 / difficulty.wrapping_neg() as f64
    }

    pub fn from_multiplier(multiplier: f64, base: u64) -> u64 {
        debug_assert!(multiplier > 0f64);
        let reverse = (base.wrapping_neg() as f64 / multiplier) as u64;
        reverse.wrapping_neg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_is_deterministic() {
        let root = Root::from(42);
        assert_eq!(
            DifficultyV1::get_difficulty(&root, 1),
            DifficultyV1::get_difficulty(&root, 1)
        );
        assert_ne!(
            DifficultyV1::get_difficulty(&root, 1),
            DifficultyV1::get_difficulty(&root, 2)
        );
    }

    #[test]
    fn multiplier_round_trip() {
        let base = 0xffffffc000000000;
        for &difficulty in &[0xfffffff800000000u64, 0xfffffe0000000000u64] {
            let multiplier = DifficultyV1::to_multiplier(difficulty, base);
            assert_eq!(DifficultyV1::from_multiplier(multiplier, base), difficulty);
        }
    }

    #[test]
    fn multiplier_reference_values() {
        assert!(
            (DifficultyV1::to_multiplier(0xfffffff800000000, 0xffffffc000000000) - 8.0).abs()
                < 1e-10
        );
        assert!(
            (DifficultyV1::to_multiplier(0xfffffe0000000000, 0xffffffc000000000) - 0.125).abs()
                < 1e-10
        );
    }
}

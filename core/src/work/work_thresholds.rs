use super::{DifficultyV1, WorkVersion};
use crate::{Block, BlockDetails, BlockType, Epoch, Root};
use once_cell::sync::Lazy;
use std::cmp::{max, min};

pub static WORK_THRESHOLDS_STUB: Lazy<WorkThresholds> = Lazy::new(WorkThresholds::publish_dev);

#[derive(Clone, Debug, PartialEq)]
pub struct WorkThresholds {
    pub epoch_1: u64,
    pub epoch_2: u64,
    pub epoch_2_receive: u64,

    /// The maximum of all thresholds, used for all multiplier calculations
    pub base: u64,

    /// The minimum of all thresholds; work below this is rejected at the
    /// door, but does not guarantee a block is processable
    pub entry: u64,
}

static PUBLISH_FULL: Lazy<WorkThresholds> = Lazy::new(|| {
    WorkThresholds::new(
        0xffffffc000000000,
        0xfffffff800000000, // 8x higher than epoch_1
        0xfffffe0000000000, // 8x lower than epoch_1
    )
});

static PUBLISH_BETA: Lazy<WorkThresholds> = Lazy::new(|| {
    WorkThresholds::new(
        0xfffff00000000000, // 64x lower than publish_full.epoch_1
        0xfffff00000000000, // same as epoch_1
        0xffffe00000000000, // 2x lower than epoch_1
    )
});

static PUBLISH_DEV: Lazy<WorkThresholds> = Lazy::new(|| {
    WorkThresholds::new(
        0xfe00000000000000, // Very low for tests
        0xffc0000000000000, // 8x higher than epoch_1
        0xf000000000000000, // 8x lower than epoch_1
    )
});

impl WorkThresholds {
    pub fn new(epoch_1: u64, epoch_2: u64, epoch_2_receive: u64) -> Self {
        Self {
            epoch_1,
            epoch_2,
            epoch_2_receive,
            base: max(max(epoch_1, epoch_2), epoch_2_receive),
            entry: min(min(epoch_1, epoch_2), epoch_2_receive),
        }
    }

    pub fn publish_full() -> WorkThresholds {
        PUBLISH_FULL.clone()
    }

    pub fn publish_beta() -> WorkThresholds {
        PUBLISH_BETA.clone()
    }

    pub fn publish_dev() -> WorkThresholds {
        PUBLISH_DEV.clone()
    }

    pub fn threshold_entry(&self, block_type: BlockType, work_version: WorkVersion) -> u64 {
        match block_type {
            BlockType::State => match work_version {
                WorkVersion::Work1 => self.entry,
                _ => u64::MAX,
            },
            _ => self.epoch_1,
        }
    }

    pub fn threshold(&self, details: &BlockDetails) -> u64 {
        match details.epoch {
            Epoch::Epoch2 => {
                if details.is_receive || details.is_epoch {
                    self.epoch_2_receive
                } else {
                    self.epoch_2
                }
            }
            Epoch::Epoch0 | Epoch::Epoch1 => self.epoch_1,
            _ => u64::MAX,
        }
    }

    pub fn threshold2(&self, work_version: WorkVersion, details: &BlockDetails) -> u64 {
        match work_version {
            WorkVersion::Work1 => self.threshold(details),
            _ => u64::MAX,
        }
    }

    pub fn threshold_base(&self, work_version: WorkVersion) -> u64 {
        match work_version {
            WorkVersion::Work1 => self.base,
            _ => u64::MAX,
        }
    }

    /// Normalizes a multiplier calculated against one threshold into the
    /// space of the maximum (epoch 2 send) threshold, so that multipliers of
    /// blocks with different subtypes are comparable.
    ///
    /// ratio = multiplier of the max threshold from the given threshold,
    /// normalized = (multiplier + (ratio - 1)) / ratio
    ///
    /// Epoch 1: 1.0 → 1.0, 9.0 → 2.0, 25.0 → 4.0
    /// Epoch 2 (receive/epoch subtypes): 1.0 → 1.0, 65.0 → 2.0, 241.0 → 4.0
    pub fn normalized_multiplier(&self, multiplier: f64, threshold: u64) -> f64 {
        debug_assert!(multiplier >= 1f64);
        if threshold == self.epoch_1 || threshold == self.epoch_2_receive {
            let ratio = DifficultyV1::to_multiplier(self.epoch_2, threshold);
            debug_assert!(ratio >= 1f64);
            let result = (multiplier + (ratio - 1f64)) / ratio;
            debug_assert!(result >= 1f64);
            result
        } else {
            multiplier
        }
    }

    pub fn denormalized_multiplier(&self, multiplier: f64, threshold: u64) -> f64 {
        debug_assert!(multiplier >= 1f64);
        if threshold == self.epoch_1 || threshold == self.epoch_2_receive {
            let ratio = DifficultyV1::to_multiplier(self.epoch_2, threshold);
            debug_assert!(ratio >= 1f64);
            let result = multiplier * ratio + 1f64 - ratio;
            debug_assert!(result >= 1f64);
            result
        } else {
            multiplier
        }
    }

    pub fn difficulty(&self, work_version: WorkVersion, root: &Root, work: u64) -> u64 {
        match work_version {
            WorkVersion::Work1 => DifficultyV1::get_difficulty(root, work),
            _ => 0,
        }
    }

    pub fn difficulty_block(&self, block: &Block) -> u64 {
        self.difficulty(WorkVersion::Work1, &block.root(), block.work())
    }

    /// Normalized multiplier of a block against the threshold for its details
    pub fn multiplier_block(&self, block: &Block, details: &BlockDetails) -> f64 {
        let threshold = self.threshold(details);
        let difficulty = self.difficulty_block(block);
        let multiplier = DifficultyV1::to_multiplier(max(difficulty, 1), threshold).max(1f64);
        self.normalized_multiplier(multiplier, threshold)
    }

    pub fn entry_valid(&self, block: &Block) -> bool {
        self.difficulty_block(block)
            >= self.threshold_entry(block.block_type(), WorkVersion::Work1)
    }

    pub fn is_valid_pow(&self, block: &Block, details: &BlockDetails) -> bool {
        self.difficulty_block(block) >= self.threshold2(WorkVersion::Work1, details)
    }
}

mod stats;

pub use stats::{DetailType, Direction, Sample, StatType, Stats};

use vanta_ledger::BlockStatus;

impl From<BlockStatus> for DetailType {
    fn from(value: BlockStatus) -> Self {
        match value {
            BlockStatus::Progress => DetailType::Progress,
            BlockStatus::Old => DetailType::Old,
            BlockStatus::BadSignature => DetailType::BadSignature,
            BlockStatus::GapPrevious => DetailType::GapPrevious,
            BlockStatus::GapSource => DetailType::GapSource,
            BlockStatus::GapEpochOpenPending => DetailType::GapEpochOpenPending,
            BlockStatus::Fork => DetailType::Fork,
            BlockStatus::NegativeSpend => DetailType::NegativeSpend,
            BlockStatus::Unreceivable => DetailType::Unreceivable,
            BlockStatus::OpenedBurnAccount => DetailType::OpenedBurnAccount,
            BlockStatus::BalanceMismatch => DetailType::BalanceMismatch,
            BlockStatus::RepresentativeMismatch => DetailType::RepresentativeMismatch,
            BlockStatus::BlockPosition => DetailType::BlockPosition,
            BlockStatus::InsufficientWork => DetailType::InsufficientWork,
        }
    }
}

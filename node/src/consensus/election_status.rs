use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};
use vanta_core::{Amount, Block};

/// Tag for the type of the election status
#[repr(u8)]
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum ElectionStatusType {
    Ongoing = 0,
    ActiveConfirmedQuorum = 1,
    ActiveConfirmationHeight = 2,
    InactiveConfirmationHeight = 3,
    #[default]
    Stopped = 5,
}

/// Information on the status of an election
#[derive(Clone, Default)]
pub struct ElectionStatus {
    pub winner: Option<Arc<Block>>,
    pub tally: Amount,
    pub election_end: Option<SystemTime>,
    pub election_duration: Duration,
    pub confirmation_request_count: u32,
    pub block_count: u32,
    pub voter_count: u32,
    pub election_status_type: ElectionStatusType,
}

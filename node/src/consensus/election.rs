use super::{ElectionStatus, ElectionStatusType};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant, SystemTime},
};
use vanta_core::{Amount, Block, BlockHash, PublicKey, QualifiedRoot, Root, NOT_AN_ACCOUNT};

pub static NEXT_ELECTION_ID: AtomicUsize = AtomicUsize::new(1);

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ElectionState {
    /// Only listening for incoming votes
    Passive,
    /// Actively requesting confirmations
    Active,
    /// Requesting confirmations and broadcasting the winner
    Broadcasting,
    /// Confirmed but still listening for votes
    Confirmed,
    ExpiredConfirmed,
    ExpiredUnconfirmed,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ElectionBehavior {
    Normal,
    /// Started ahead of its dependencies being confirmed, expires quickly
    Optimistic,
}

/// The most recent vote recorded from one representative
#[derive(Clone, Debug)]
pub struct VoteInfo {
    pub time: Instant,
    pub timestamp: u64,
    pub hash: BlockHash,
}

impl VoteInfo {
    pub fn new(timestamp: u64, hash: BlockHash) -> Self {
        Self {
            time: Instant::now(),
            timestamp,
            hash,
        }
    }

    /// A synthetic vote seeded from the inactive vote cache; its age never
    /// gates the first live vote from the same representative.
    pub fn new_aged(timestamp: u64, hash: BlockHash) -> Self {
        Self {
            time: Instant::now() - Duration::from_secs(60 * 60),
            timestamp,
            hash,
        }
    }
}

/// State of an election protected by the election mutex
pub struct ElectionData {
    pub state: ElectionState,
    pub state_start: Instant,
    pub status: ElectionStatus,
    pub last_votes: HashMap<PublicKey, VoteInfo>,
    pub last_blocks: HashMap<BlockHash, Arc<Block>>,
    pub last_tally: HashMap<BlockHash, Amount>,
    pub last_block_time: Option<Instant>,
    pub last_req: Option<Instant>,
    /// Last time a local vote for this election was generated
    pub last_vote: Option<Instant>,
    /// Hash of the winner version that was last broadcast
    pub last_block_hash: BlockHash,
}

impl ElectionData {
    pub fn is_confirmed(&self) -> bool {
        matches!(
            self.state,
            ElectionState::Confirmed | ElectionState::ExpiredConfirmed
        )
    }

    pub fn is_failed(&self) -> bool {
        self.state == ElectionState::ExpiredUnconfirmed
    }

    fn valid_change(expected: ElectionState, desired: ElectionState) -> bool {
        match expected {
            ElectionState::Passive => matches!(
                desired,
                ElectionState::Active
                    | ElectionState::Confirmed
                    | ElectionState::ExpiredUnconfirmed
            ),
            ElectionState::Active => matches!(
                desired,
                ElectionState::Broadcasting
                    | ElectionState::Confirmed
                    | ElectionState::ExpiredUnconfirmed
            ),
            ElectionState::Broadcasting => matches!(
                desired,
                ElectionState::Confirmed | ElectionState::ExpiredUnconfirmed
            ),
            ElectionState::Confirmed => matches!(desired, ElectionState::ExpiredConfirmed),
            ElectionState::ExpiredConfirmed | ElectionState::ExpiredUnconfirmed => false,
        }
    }

    pub fn state_change(
        &mut self,
        expected: ElectionState,
        desired: ElectionState,
    ) -> Result<(), ()> {
        if self.state == expected && Self::valid_change(expected, desired) {
            self.state = desired;
            self.state_start = Instant::now();
            Ok(())
        } else {
            Err(())
        }
    }

    pub fn update_status_to_confirmed(
        &mut self,
        election: &Election,
        status_type: ElectionStatusType,
    ) {
        self.status.election_end = Some(SystemTime::now());
        self.status.election_duration = election.election_start.elapsed();
        self.status.confirmation_request_count =
            election.confirmation_request_count.load(Ordering::SeqCst);
        self.status.block_count = self.last_blocks.len() as u32;
        self.status.voter_count = self.last_votes.len() as u32;
        self.status.election_status_type = status_type;
    }
}

pub type ConfirmationAction = Box<dyn Fn(Arc<Block>) + Send + Sync>;
pub type LiveVoteAction = Box<dyn Fn(PublicKey) + Send + Sync>;

/// A single conflict being driven to confirmation. One election exists per
/// qualified root; all seen forks of the slot live in `last_blocks`.
pub struct Election {
    pub id: usize,
    pub qualified_root: QualifiedRoot,
    pub root: Root,
    pub behavior: ElectionBehavior,
    pub election_start: Instant,
    pub mutex: Mutex<ElectionData>,
    pub confirmation_request_count: AtomicU32,
    /// Elections for local wallet sends are never dropped on overflow
    pub from_local_wallet: bool,
    prioritized: AtomicBool,
    /// Normalized work multiplier of the highest work block seen
    multiplier: Mutex<f64>,
    pub confirmation_action: ConfirmationAction,
    pub live_vote_action: LiveVoteAction,
}

impl Election {
    pub const PASSIVE_DURATION_FACTOR: u32 = 5;
    pub const ACTIVE_REQUEST_COUNT_MIN: u32 = 2;
    pub const CONFIRMED_DURATION_FACTOR: u32 = 5;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        block: Arc<Block>,
        behavior: ElectionBehavior,
        prioritized: bool,
        from_local_wallet: bool,
        multiplier: f64,
        confirmation_action: ConfirmationAction,
        live_vote_action: LiveVoteAction,
    ) -> Self {
        let mut last_votes = HashMap::new();
        last_votes.insert(*NOT_AN_ACCOUNT, VoteInfo::new(0, block.hash()));

        let mut last_blocks = HashMap::new();
        last_blocks.insert(block.hash(), Arc::clone(&block));

        let data = ElectionData {
            state: ElectionState::Passive,
            state_start: Instant::now(),
            status: ElectionStatus {
                winner: Some(Arc::clone(&block)),
                election_status_type: ElectionStatusType::Ongoing,
                block_count: 1,
                ..Default::default()
            },
            last_votes,
            last_blocks,
            last_tally: HashMap::new(),
            last_block_time: None,
            last_req: None,
            last_vote: None,
            last_block_hash: BlockHash::zero(),
        };

        Self {
            id,
            qualified_root: block.qualified_root(),
            root: block.root(),
            behavior,
            election_start: Instant::now(),
            mutex: Mutex::new(data),
            confirmation_request_count: AtomicU32::new(0),
            from_local_wallet,
            prioritized: AtomicBool::new(prioritized),
            multiplier: Mutex::new(multiplier),
            confirmation_action,
            live_vote_action,
        }
    }

    pub fn is_optimistic(&self) -> bool {
        self.behavior == ElectionBehavior::Optimistic
    }

    pub fn prioritized(&self) -> bool {
        self.prioritized.load(Ordering::SeqCst)
    }

    pub fn prioritize(&self) {
        self.prioritized.store(true, Ordering::SeqCst);
    }

    pub fn multiplier(&self) -> f64 {
        *self.multiplier.lock().unwrap()
    }

    /// Raises the stored multiplier; fork and republish arrivals only ever
    /// increase election priority
    pub fn update_multiplier(&self, multiplier: f64) -> bool {
        let mut guard = self.multiplier.lock().unwrap();
        if multiplier > *guard {
            *guard = multiplier;
            true
        } else {
            false
        }
    }

    pub fn duration(&self) -> Duration {
        self.election_start.elapsed()
    }

    pub fn last_req_elapsed(&self) -> Duration {
        match self.mutex.lock().unwrap().last_req {
            Some(instant) => instant.elapsed(),
            None => Duration::from_secs(60 * 60),
        }
    }

    pub fn last_block_elapsed(&self) -> Duration {
        match self.mutex.lock().unwrap().last_block_time {
            Some(instant) => instant.elapsed(),
            None => Duration::from_secs(60 * 60),
        }
    }
}

impl std::fmt::Debug for Election {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Election")
            .field("id", &self.id)
            .field("qualified_root", &self.qualified_root)
            .field("behavior", &self.behavior)
            .finish()
    }
}

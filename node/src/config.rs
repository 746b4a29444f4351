use crate::{
    cementation::ConfirmingSetConfig,
    consensus::{
        ActiveElectionsConfig, RequestAggregatorConfig, VoteCacheConfig, VoteProcessorConfig,
    },
};
use std::time::Duration;
use vanta_core::Amount;
use vanta_ledger::{LedgerConstants, LEDGER_CONSTANTS_STUB};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Networks {
    Dev,
    Beta,
    Live,
}

/// Protocol level timings, fixed per network
#[derive(Clone)]
pub struct NetworkConstants {
    pub current_network: Networks,
}

impl NetworkConstants {
    pub fn new(network: Networks) -> Self {
        Self {
            current_network: network,
        }
    }

    pub fn is_dev_network(&self) -> bool {
        self.current_network == Networks::Dev
    }

    /// Base unit all election timings are derived from
    pub fn base_latency(&self) -> Duration {
        if self.is_dev_network() {
            Duration::from_millis(25)
        } else {
            Duration::from_millis(1000)
        }
    }

    /// Interval of the election scheduler tick
    pub fn aec_loop_interval(&self) -> Duration {
        self.base_latency()
    }

    /// Hard deadline for an unconfirmed election
    pub fn election_expiration(&self) -> Duration {
        Duration::from_secs(5 * 60)
    }

    /// Hard deadline for an unconfirmed optimistic election
    pub fn optimistic_election_expiration(&self) -> Duration {
        if self.is_dev_network() {
            Duration::from_millis(500)
        } else {
            Duration::from_secs(60)
        }
    }

    /// Aggregator waits at most this long before answering a pool
    pub fn aggregator_max_delay(&self) -> Duration {
        if self.is_dev_network() {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(300)
        }
    }

    /// Deadline extension applied per newly arriving request
    pub fn aggregator_small_delay(&self) -> Duration {
        if self.is_dev_network() {
            Duration::from_millis(10)
        } else {
            Duration::from_millis(50)
        }
    }

    /// Batching delay of the local vote generator
    pub fn vote_generator_delay(&self) -> Duration {
        if self.is_dev_network() {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(100)
        }
    }

    /// Minimum time between local votes for different forks of one slot
    pub fn vote_spacing_delay(&self) -> Duration {
        if self.is_dev_network() {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(6)
        }
    }

    /// Sampling period of the online weight sampler
    pub fn weight_period(&self) -> Duration {
        if self.is_dev_network() {
            Duration::from_secs(1)
        } else {
            Duration::from_secs(5 * 60)
        }
    }
}

#[derive(Clone)]
pub struct NetworkParams {
    pub network: NetworkConstants,
    pub ledger: LedgerConstants,
}

impl NetworkParams {
    pub fn new(network: Networks) -> Self {
        let ledger = match network {
            Networks::Dev => LEDGER_CONSTANTS_STUB.clone(),
            // Only the dev network constants ship with the consensus core
            _ => LEDGER_CONSTANTS_STUB.clone(),
        };
        Self {
            network: NetworkConstants::new(network),
            ledger,
        }
    }

    pub fn dev() -> Self {
        Self::new(Networks::Dev)
    }
}

#[derive(Clone)]
pub struct NodeConfig {
    pub enable_voting: bool,
    pub online_weight_minimum: Amount,
    /// Votes from representatives below this weight are not counted
    pub representative_vote_weight_minimum: Amount,
    pub max_weight_samples: u64,
    /// Number of samples the online weight trend is averaged over
    pub weight_trend_window: usize,
    pub active_elections: ActiveElectionsConfig,
    pub vote_cache: VoteCacheConfig,
    pub vote_processor: VoteProcessorConfig,
    pub request_aggregator: RequestAggregatorConfig,
    pub confirming_set: ConfirmingSetConfig,
}

impl NodeConfig {
    pub fn default_for(_network: Networks) -> Self {
        Self {
            enable_voting: true,
            online_weight_minimum: Amount::vanta(60_000_000),
            representative_vote_weight_minimum: Amount::millivanta(10),
            max_weight_samples: 4032,
            weight_trend_window: 14,
            active_elections: ActiveElectionsConfig::default(),
            vote_cache: VoteCacheConfig::default(),
            vote_processor: VoteProcessorConfig::default(),
            request_aggregator: RequestAggregatorConfig::default(),
            confirming_set: ConfirmingSetConfig::default(),
        }
    }

    pub fn dev() -> Self {
        Self {
            representative_vote_weight_minimum: Amount::zero(),
            ..Self::default_for(Networks::Dev)
        }
    }
}

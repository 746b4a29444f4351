mod active_transactions;
mod confirmation_solicitor;
mod election;
mod election_status;
mod local_vote_history;
mod recently_confirmed;
mod request_aggregator;
mod vote_cache;
mod vote_generator;
mod vote_processor;
mod vote_processor_queue;
mod vote_spacing;

pub use active_transactions::{
    ActiveElectionsConfig, ActiveTransactions, ActiveTransactionsData, ActiveTransactionsExt,
    ElectionEndCallback, OrderedRoots, TallyKey,
};
pub(crate) use active_transactions::ActiveTransactionsInternal;
pub use confirmation_solicitor::ConfirmationSolicitor;
pub use election::{
    Election, ElectionBehavior, ElectionData, ElectionState, VoteInfo, NEXT_ELECTION_ID,
};
pub use election_status::{ElectionStatus, ElectionStatusType};
pub use local_vote_history::LocalVoteHistory;
pub use recently_confirmed::{RecentlyConfirmedCache, RecentlyDroppedCache};
pub use request_aggregator::{RequestAggregator, RequestAggregatorConfig, RequestAggregatorExt};
pub use vote_cache::{CacheEntry, CacheTriggers, InactiveCacheStatus, VoteCache, VoteCacheConfig};
pub use vote_generator::{VoteGenerator, VoteGeneratorExt};
pub use vote_processor::{VoteProcessor, VoteProcessorExt};
pub use vote_processor_queue::{VoteProcessorConfig, VoteProcessorQueue};
pub use vote_spacing::VoteSpacing;

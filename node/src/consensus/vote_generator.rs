use super::{LocalVoteHistory, VoteSpacing};
use crate::{
    stats::{DetailType, StatType, Stats},
    transport::{Channel, Message, Network},
    wallets::Wallets,
};
use std::{
    collections::VecDeque,
    sync::{Arc, Condvar, Mutex},
    thread::JoinHandle,
    time::Duration,
};
use tracing::trace;
use vanta_core::{BlockHash, Root, Vote};
use vanta_ledger::Ledger;

pub type VoteGeneratedCallback = Box<dyn Fn(&Arc<Vote>) + Send + Sync>;

struct VoteGeneratorState {
    candidates: VecDeque<(Root, BlockHash)>,
    stopped: bool,
}

/// Produces signed votes from the local wallet representatives. Election
/// driven requests are queued and broadcast in batches; the request
/// aggregator generates synchronously per peer.
pub struct VoteGenerator {
    ledger: Arc<Ledger>,
    wallets: Arc<Wallets>,
    history: Arc<LocalVoteHistory>,
    spacing: Mutex<VoteSpacing>,
    network: Arc<Network>,
    stats: Arc<Stats>,
    mutex: Mutex<VoteGeneratorState>,
    condition: Condvar,
    thread: Mutex<Option<JoinHandle<()>>>,
    /// Generated broadcast votes are also handed back to the local vote
    /// pipeline, so our own elections count them
    vote_generated: Mutex<Vec<VoteGeneratedCallback>>,
    batch_delay: Duration,
}

impl VoteGenerator {
    pub fn new(
        ledger: Arc<Ledger>,
        wallets: Arc<Wallets>,
        history: Arc<LocalVoteHistory>,
        network: Arc<Network>,
        stats: Arc<Stats>,
        spacing_delay: Duration,
        batch_delay: Duration,
    ) -> Self {
        Self {
            ledger,
            wallets,
            history,
            spacing: Mutex::new(VoteSpacing::new(spacing_delay)),
            network,
            stats,
            mutex: Mutex::new(VoteGeneratorState {
                candidates: VecDeque::new(),
                stopped: false,
            }),
            condition: Condvar::new(),
            thread: Mutex::new(None),
            vote_generated: Mutex::new(Vec::new()),
            batch_delay,
        }
    }

    pub fn on_vote_generated(&self, callback: VoteGeneratedCallback) {
        self.vote_generated.lock().unwrap().push(callback);
    }

    /// Queues a broadcast vote for an election winner. Only blocks whose
    /// dependencies are confirmed are votable.
    pub fn add(&self, root: &Root, hash: &BlockHash) {
        let votable = {
            let txn = self.ledger.read_txn();
            match self.ledger.any().get_block(&txn, hash) {
                Some(block) => {
                    self.ledger.dependents_confirmed(&txn, &block)
                        && self.spacing.lock().unwrap().votable(root, hash)
                }
                None => false,
            }
        };
        if !votable {
            self.stats
                .inc(StatType::VoteGenerator, DetailType::GeneratorSpacing);
            return;
        }

        let notify = {
            let mut guard = self.mutex.lock().unwrap();
            guard.candidates.push_back((*root, *hash));
            guard.candidates.len() >= Vote::MAX_HASHES
        };

        if notify {
            self.condition.notify_all();
        }
    }

    fn run(&self) {
        let mut guard = self.mutex.lock().unwrap();
        while !guard.stopped {
            if guard.candidates.len() >= Vote::MAX_HASHES {
                guard = self.broadcast(guard);
            } else {
                guard = self
                    .condition
                    .wait_timeout_while(guard, self.batch_delay, |state| {
                        !state.stopped && state.candidates.len() < Vote::MAX_HASHES
                    })
                    .unwrap()
                    .0;
                if !guard.candidates.is_empty() {
                    guard = self.broadcast(guard);
                }
            }
        }
    }

    fn broadcast<'a>(
        &'a self,
        mut guard: std::sync::MutexGuard<'a, VoteGeneratorState>,
    ) -> std::sync::MutexGuard<'a, VoteGeneratorState> {
        let mut batch = Vec::with_capacity(Vote::MAX_HASHES);
        while batch.len() < Vote::MAX_HASHES {
            match guard.candidates.pop_front() {
                Some(candidate) => batch.push(candidate),
                None => break,
            }
        }
        drop(guard);

        if !batch.is_empty() {
            let hashes: Vec<BlockHash> = batch.iter().map(|(_, hash)| *hash).collect();
            let votes = self.generate_votes(&hashes);
            for vote in &votes {
                for (root, hash) in &batch {
                    self.history.add(root, hash, vote);
                    self.spacing.lock().unwrap().flag(root, hash);
                }
                self.network.flood_vote(vote);
                let callbacks = self.vote_generated.lock().unwrap();
                for callback in callbacks.iter() {
                    callback(vote);
                }
            }
            self.stats.add(
                StatType::VoteGenerator,
                DetailType::GeneratorBroadcasts,
                votes.len() as u64,
            );
            self.stats.add(
                StatType::VoteGenerator,
                DetailType::GeneratorHashes,
                hashes.len() as u64,
            );
        }

        self.mutex.lock().unwrap()
    }

    /// Signs one vote per wallet representative over the given hashes,
    /// records them in the local vote history and sends them to `channel`.
    /// Returns the number of generated votes.
    pub fn generate(&self, hashes: &[(Root, BlockHash)], channel: &Channel) -> usize {
        if hashes.is_empty() {
            return 0;
        }
        debug_assert!(hashes.len() <= Vote::MAX_HASHES);

        let hash_list: Vec<BlockHash> = hashes.iter().map(|(_, hash)| *hash).collect();
        let votes = self.generate_votes(&hash_list);
        for vote in &votes {
            for (root, hash) in hashes {
                self.history.add(root, hash, vote);
                self.spacing.lock().unwrap().flag(root, hash);
            }
            channel.send(Message::ConfirmAck((**vote).clone()));
            trace!(
                account = %vote.voting_account,
                hashes = vote.hashes.len(),
                "vote generated"
            );
        }
        self.stats.add(
            StatType::VoteGenerator,
            DetailType::RequestsGeneratedVotes,
            votes.len() as u64,
        );
        votes.len()
    }

    fn generate_votes(&self, hashes: &[BlockHash]) -> Vec<Arc<Vote>> {
        let mut votes = Vec::new();
        self.wallets.foreach_representative(|key| {
            // Sequence numbers persist across restarts, newer votes always
            // supersede what we published before
            let mut txn = self.ledger.rw_txn();
            let representative = key.public_key();
            let sequence = self.ledger.store.vote.get(&txn, &representative) + 1;
            self.ledger.store.vote.put(&mut txn, &representative, sequence);
            votes.push(Arc::new(Vote::new(key, sequence, hashes.to_vec())));
        });
        self.stats
            .add(StatType::VoteGenerator, DetailType::GenerateVote, votes.len() as u64);
        votes
    }

    pub fn stop(&self) {
        self.mutex.lock().unwrap().stopped = true;
        self.condition.notify_all();
        if let Some(handle) = self.thread.lock().unwrap().take() {
            handle.join().unwrap();
        }
    }
}

pub trait VoteGeneratorExt {
    fn start(&self);
}

impl VoteGeneratorExt for Arc<VoteGenerator> {
    fn start(&self) {
        let mut guard = self.thread.lock().unwrap();
        debug_assert!(guard.is_none());
        let self_clone = Arc::clone(self);
        *guard = Some(
            std::thread::Builder::new()
                .name("Voting".to_string())
                .spawn(move || self_clone.run())
                .unwrap(),
        );
    }
}

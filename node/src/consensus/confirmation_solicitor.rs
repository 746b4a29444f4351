use super::{Election, ElectionData};
use crate::transport::{Channel, ChannelId, Message, Network};
use std::{collections::HashMap, sync::Arc};
use vanta_core::{BlockHash, Root};

/// Batches winner broadcasts and confirmation requests accumulated over one
/// scheduler tick, flushing them per peer at the end of the tick.
pub struct ConfirmationSolicitor<'a> {
    network: &'a Network,
    /// Channels of the representatives solicited this tick
    representatives: Vec<Arc<Channel>>,
    requests: HashMap<ChannelId, (Arc<Channel>, Vec<(BlockHash, Root)>)>,
    rebroadcasted: usize,
    prepared: bool,
}

impl<'a> ConfirmationSolicitor<'a> {
    /// Global maximum amount of block broadcasts per tick
    const MAX_BLOCK_BROADCASTS: usize = 30;
    /// Maximum amount of requests to be sent per election
    const MAX_ELECTION_REQUESTS: usize = 50;
    /// Roots per confirm_req message
    const MAX_CONFIRM_REQ_ROOTS: usize = 7;

    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            representatives: Vec::new(),
            requests: HashMap::new(),
            rebroadcasted: 0,
            prepared: false,
        }
    }

    /// Prepare object for batching election confirmation requests
    pub fn prepare(&mut self, representatives: Vec<Arc<Channel>>) {
        debug_assert!(!self.prepared);
        self.representatives = representatives;
        self.requests.clear();
        self.rebroadcasted = 0;
        self.prepared = true;
    }

    /// Broadcast the winner of an election to everyone. Returns Err if the
    /// broadcast quota for this tick is used up.
    pub fn broadcast(&mut self, guard: &ElectionData) -> Result<(), ()> {
        debug_assert!(self.prepared);
        if self.rebroadcasted >= Self::MAX_BLOCK_BROADCASTS {
            return Err(());
        }
        self.rebroadcasted += 1;

        let winner = guard.status.winner.as_ref().unwrap();
        self.network.flood_block(winner);
        Ok(())
    }

    /// Request confirmation for the election's winner from the prepared
    /// representatives. Returns true if no request could be queued.
    pub fn add(&mut self, election: &Election, guard: &ElectionData) -> bool {
        debug_assert!(self.prepared);
        let winner_hash = guard.status.winner.as_ref().unwrap().hash();

        let mut error = true;
        let mut count = 0;
        for channel in &self.representatives {
            if count >= Self::MAX_ELECTION_REQUESTS {
                break;
            }
            let entry = self
                .requests
                .entry(channel.channel_id)
                .or_insert_with(|| (Arc::clone(channel), Vec::new()));
            entry.1.push((winner_hash, election.root));
            count += 1;
            error = false;
        }
        // With no known representatives the request still counts as made;
        // the election keeps progressing on local votes alone
        if self.representatives.is_empty() {
            error = false;
        }
        error
    }

    /// Dispatch the accumulated confirmation requests
    pub fn flush(&mut self) {
        debug_assert!(self.prepared);
        for (_, (channel, roots_hashes)) in self.requests.drain() {
            for chunk in roots_hashes.chunks(Self::MAX_CONFIRM_REQ_ROOTS) {
                channel.send(Message::ConfirmReq(chunk.to_vec()));
            }
        }
        self.prepared = false;
    }
}

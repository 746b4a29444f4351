use std::sync::Mutex;
use vanta_core::{Block, BlockHash, Root, Vote};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ChannelId(usize);

impl ChannelId {
    pub const LOOPBACK: ChannelId = ChannelId(0);
}

impl From<usize> for ChannelId {
    fn from(value: usize) -> Self {
        ChannelId(value)
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Messages exchanged with peers. Wire encoding happens outside the
/// consensus core; these are the decoded forms.
#[derive(Clone, Debug)]
pub enum Message {
    Publish(Block),
    ConfirmReq(Vec<(BlockHash, Root)>),
    ConfirmAck(Vote),
}

/// A connection to one peer. The consensus core only queues outbound
/// messages; the transport drains them.
pub struct Channel {
    pub channel_id: ChannelId,
    sent: Mutex<Vec<Message>>,
}

impl Channel {
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn send(&self, message: Message) {
        self.sent.lock().unwrap().push(message);
    }

    /// Outbound messages queued so far; the transport (or a test) drains them
    pub fn drain(&self) -> Vec<Message> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

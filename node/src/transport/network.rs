use super::{Channel, ChannelId, Message, PublishFilter};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use vanta_core::{Block, Vote};

pub type ChannelAddedCallback = Box<dyn Fn(&Arc<Channel>) + Send + Sync>;

/// The consensus core's view of the peer network: registered channels, block
/// and vote flooding and the publish duplicate filter.
pub struct Network {
    channels: Mutex<HashMap<ChannelId, Arc<Channel>>>,
    next_channel_id: AtomicUsize,
    channel_added_observers: Mutex<Vec<ChannelAddedCallback>>,
    pub publish_filter: PublishFilter,
}

impl Network {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            next_channel_id: AtomicUsize::new(1),
            channel_added_observers: Mutex::new(Vec::new()),
            publish_filter: PublishFilter::new(),
        }
    }

    pub fn on_channel_added(&self, callback: ChannelAddedCallback) {
        self.channel_added_observers.lock().unwrap().push(callback);
    }

    pub fn add_channel(&self) -> Arc<Channel> {
        let id = ChannelId::from(self.next_channel_id.fetch_add(1, Ordering::Relaxed));
        let channel = Arc::new(Channel::new(id));
        self.channels
            .lock()
            .unwrap()
            .insert(id, Arc::clone(&channel));
        let observers = self.channel_added_observers.lock().unwrap();
        for observer in observers.iter() {
            observer(&channel);
        }
        drop(observers);
        channel
    }

    pub fn channel(&self, id: ChannelId) -> Option<Arc<Channel>> {
        self.channels.lock().unwrap().get(&id).cloned()
    }

    pub fn channels(&self) -> Vec<Arc<Channel>> {
        self.channels.lock().unwrap().values().cloned().collect()
    }

    pub fn flood_block(&self, block: &Block) {
        self.flood(Message::Publish(block.clone()));
    }

    pub fn flood_vote(&self, vote: &Vote) {
        self.flood(Message::ConfirmAck(vote.clone()));
    }

    fn flood(&self, message: Message) {
        for channel in self.channels.lock().unwrap().values() {
            channel.send(message.clone());
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

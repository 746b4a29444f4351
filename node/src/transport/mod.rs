mod channel;
mod network;
mod publish_filter;

pub use channel::{Channel, ChannelId, Message};
pub use network::Network;
pub use publish_filter::PublishFilter;

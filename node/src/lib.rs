#[macro_use]
extern crate anyhow;

pub mod block_processing;
pub mod cementation;
pub mod consensus;
pub mod representatives;
pub mod stats;
pub mod test_helpers;
pub mod transport;
pub mod utils;

mod config;
mod node;
mod wallets;

pub use config::{NetworkConstants, NetworkParams, Networks, NodeConfig};
pub use node::Node;
pub use wallets::Wallets;

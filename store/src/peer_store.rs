use crate::{Transaction, WriteTransaction};
use std::{
    collections::BTreeMap,
    net::SocketAddrV6,
    sync::{Arc, RwLock},
};

/// Known peer endpoints and when they were last seen (milliseconds since
/// unix epoch). Consumed by peer discovery on restart.
#[derive(Clone, Default)]
pub struct PeerStore {
    db: Arc<RwLock<BTreeMap<SocketAddrV6, u64>>>,
}

impl PeerStore {
    pub fn put(&self, _tx: &mut WriteTransaction, endpoint: SocketAddrV6, time: u64) {
        self.db.write().unwrap().insert(endpoint, time);
    }

    pub fn del(&self, _tx: &mut WriteTransaction, endpoint: &SocketAddrV6) {
        self.db.write().unwrap().remove(endpoint);
    }

    pub fn exists(&self, _tx: &dyn Transaction, endpoint: &SocketAddrV6) -> bool {
        self.db.read().unwrap().contains_key(endpoint)
    }

    pub fn count(&self, _tx: &dyn Transaction) -> u64 {
        self.db.read().unwrap().len() as u64
    }

    pub fn iter(&self, _tx: &dyn Transaction) -> Vec<(SocketAddrV6, u64)> {
        self.db
            .read()
            .unwrap()
            .iter()
            .map(|(endpoint, time)| (*endpoint, *time))
            .collect()
    }
}

use std::{
    collections::VecDeque,
    sync::{Arc, Condvar, Mutex},
};

/// Distinct areas write locking is done, order is irrelevant
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Writer {
    ProcessBatch,
    ConfirmationHeight,
    Rollback,
    OnlineWeight,
    VoteGenerator,
    Testing,
}

pub struct WriteGuard {
    guard_finish_callback: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl WriteGuard {
    fn new(guard_finish_callback: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self {
            guard_finish_callback: Some(guard_finish_callback),
        }
    }

    pub fn release(&mut self) {
        if let Some(callback) = self.guard_finish_callback.take() {
            callback();
        }
    }

    pub fn is_owned(&self) -> bool {
        self.guard_finish_callback.is_some()
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Serializes ledger writers. Each writer role may wait at most once; the
/// queue hands out guards in arrival order.
pub struct WriteQueue {
    data: Arc<WriteQueueData>,
    guard_finish_callback: Arc<dyn Fn() + Send + Sync>,
}

struct WriteQueueData {
    queue: Mutex<VecDeque<Writer>>,
    condition: Condvar,
}

impl WriteQueue {
    pub fn new() -> Self {
        let data = Arc::new(WriteQueueData {
            queue: Mutex::new(VecDeque::new()),
            condition: Condvar::new(),
        });

        let data_clone = data.clone();

        Self {
            data,
            guard_finish_callback: Arc::new(move || {
                {
                    let mut guard = data_clone.queue.lock().unwrap();
                    guard.pop_front();
                }
                data_clone.condition.notify_all();
            }),
        }
    }

    /// Blocks until we are at the head of the queue and blocks other waiters
    /// until the returned guard goes out of scope
    pub fn wait(&self, writer: Writer) -> WriteGuard {
        let lk = self.data.queue.lock().unwrap();
        debug_assert!(lk.iter().all(|i| *i != writer));

        let mut lk = lk;
        if !lk.contains(&writer) {
            lk.push_back(writer);
        }

        let _result = self
            .data
            .condition
            .wait_while(lk, |queue| queue.front() != Some(&writer));

        WriteGuard::new(Arc::clone(&self.guard_finish_callback))
    }

    /// Returns true if this writer is anywhere in the queue
    pub fn contains(&self, writer: Writer) -> bool {
        self.data.queue.lock().unwrap().contains(&writer)
    }
}

impl Default for WriteQueue {
    fn default() -> Self {
        Self::new()
    }
}

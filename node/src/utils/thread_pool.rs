use std::{
    collections::BinaryHeap,
    sync::{Arc, Condvar, Mutex},
    thread::JoinHandle,
    time::{Duration, Instant},
};

pub type Task = Box<dyn FnOnce() + Send>;

pub trait ThreadPool: Send + Sync {
    fn push_task(&self, task: Task);
    fn add_delayed_task(&self, delay: Duration, task: Task);
    fn stop(&self);
}

struct DelayedEntry {
    due: Instant,
    sequence: u64,
    task: Task,
}

impl PartialEq for DelayedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.sequence == other.sequence
    }
}

impl Eq for DelayedEntry {}

impl PartialOrd for DelayedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DelayedEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap is a max-heap, earliest due time must sort last
        other
            .due
            .cmp(&self.due)
            .then(other.sequence.cmp(&self.sequence))
    }
}

struct PoolState {
    queue: Vec<Task>,
    delayed: BinaryHeap<DelayedEntry>,
    next_sequence: u64,
    stopped: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    condition: Condvar,
}

/// Background task workers with support for delayed tasks
pub struct ThreadPoolImpl {
    shared: Arc<PoolShared>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPoolImpl {
    pub fn create(num_threads: usize, name: impl Into<String>) -> Self {
        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: Vec::new(),
                delayed: BinaryHeap::new(),
                next_sequence: 0,
                stopped: false,
            }),
            condition: Condvar::new(),
        });

        let name = name.into();
        let mut threads = Vec::with_capacity(num_threads);
        for _ in 0..num_threads {
            let shared_clone = Arc::clone(&shared);
            threads.push(
                std::thread::Builder::new()
                    .name(name.clone())
                    .spawn(move || Self::run(shared_clone))
                    .unwrap(),
            );
        }

        Self {
            shared,
            threads: Mutex::new(threads),
        }
    }

    fn run(shared: Arc<PoolShared>) {
        let mut guard = shared.state.lock().unwrap();
        loop {
            if guard.stopped {
                return;
            }

            let now = Instant::now();
            while guard
                .delayed
                .peek()
                .map(|entry| entry.due <= now)
                .unwrap_or(false)
            {
                let entry = guard.delayed.pop().unwrap();
                guard.queue.push(entry.task);
            }

            if let Some(task) = guard.queue.pop() {
                drop(guard);
                task();
                guard = shared.state.lock().unwrap();
                continue;
            }

            let timeout = guard
                .delayed
                .peek()
                .map(|entry| entry.due.saturating_duration_since(now))
                .unwrap_or(Duration::from_millis(500));

            guard = shared
                .condition
                .wait_timeout(guard, timeout)
                .unwrap()
                .0;
        }
    }

    pub fn num_queued_tasks(&self) -> usize {
        let guard = self.shared.state.lock().unwrap();
        guard.queue.len() + guard.delayed.len()
    }
}

impl ThreadPool for ThreadPoolImpl {
    fn push_task(&self, task: Task) {
        {
            let mut guard = self.shared.state.lock().unwrap();
            if guard.stopped {
                return;
            }
            guard.queue.push(task);
        }
        self.shared.condition.notify_one();
    }

    fn add_delayed_task(&self, delay: Duration, task: Task) {
        {
            let mut guard = self.shared.state.lock().unwrap();
            if guard.stopped {
                return;
            }
            let sequence = guard.next_sequence;
            guard.next_sequence += 1;
            guard.delayed.push(DelayedEntry {
                due: Instant::now() + delay,
                sequence,
                task,
            });
        }
        self.shared.condition.notify_one();
    }

    fn stop(&self) {
        {
            let mut guard = self.shared.state.lock().unwrap();
            guard.stopped = true;
            guard.queue.clear();
            guard.delayed.clear();
        }
        self.shared.condition.notify_all();
        let mut threads = self.threads.lock().unwrap();
        for handle in threads.drain(..) {
            handle.join().unwrap();
        }
    }
}

impl Drop for ThreadPoolImpl {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn executes_pushed_tasks() {
        let pool = ThreadPoolImpl::create(1, "test pool");
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        pool.push_task(Box::new(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let start = Instant::now();
        while counter.load(Ordering::SeqCst) == 0 && start.elapsed() < Duration::from_secs(5) {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn executes_delayed_tasks_after_delay() {
        let pool = ThreadPoolImpl::create(1, "test pool");
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        pool.add_delayed_task(
            Duration::from_millis(50),
            Box::new(move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        let start = Instant::now();
        while counter.load(Ordering::SeqCst) == 0 && start.elapsed() < Duration::from_secs(5) {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

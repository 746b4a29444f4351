/// Marker for a point in time view of the store. The in-memory tables give
/// row level atomicity; chain level consistency comes from the single
/// writer discipline enforced by the ledger write queue.
pub trait Transaction {}

pub struct ReadTransaction {
    _private: (),
}

impl ReadTransaction {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    /// Long running readers call this between batches; a no-op here, kept so
    /// callers do not grow a dependency on snapshot lifetimes.
    pub fn refresh_if_needed(&mut self) {}
}

impl Transaction for ReadTransaction {}

pub struct WriteTransaction {
    _private: (),
}

impl WriteTransaction {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    pub fn commit(&mut self) {}

    pub fn renew(&mut self) {}
}

impl Transaction for WriteTransaction {}

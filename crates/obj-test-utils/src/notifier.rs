//! Authority notifier that counts recomputations.

use std::sync::atomic::{AtomicUsize, Ordering};

use obj_core::AuthorityNotifier;

#[derive(Debug, Default)]
pub struct CountingNotifier {
    calls: AtomicUsize,
}

impl CountingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuthorityNotifier for CountingNotifier {
    fn recompute(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

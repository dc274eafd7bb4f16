//! Last-search-wins guard.
//!
//! Every search takes a ticket when it starts. Only the holder of the most
//! recently issued ticket may write to the display; earlier searches that
//! complete late are discarded.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Debug, Default)]
pub struct SearchGeneration {
    latest: AtomicU64,
}

impl SearchGeneration {
    /// Issues a ticket that supersedes every ticket issued before it.
    pub fn begin(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_ticket_is_current() {
        let generation = SearchGeneration::default();
        let first = generation.begin();
        assert!(generation.is_current(first));
        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }
}

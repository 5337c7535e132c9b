//! Guards against applying responses of superseded navigations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

/// Generation counter shared by every clone.
///
/// Each navigation takes a ticket with [`begin`](Self::begin). When its fetch
/// completes, the result is applied only if no newer ticket was issued in the
/// meantime. Superseded fetches are not cancelled, just ignored.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    generation: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let tracker = RequestTracker::new();
        let first = tracker.begin();
        assert!(tracker.is_current(first));

        let second = tracker.clone().begin();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }
}

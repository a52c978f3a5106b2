//! Request Guard
//!
//! Two fetches for the same key can finish out of order, and the cache keeps
//! whichever `set` lands last. A screen that reissues a request (new filter,
//! new page) takes a ticket per request and commits a response only while its
//! ticket is still the latest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

// == Request Sequence ==
/// Monotonically increasing request ids. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    latest: Arc<AtomicU64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes every earlier one.
    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while no newer ticket has been issued.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn latest(&self) -> Option<RequestTicket> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            id => Some(RequestTicket(id)),
        }
    }
}

//! Atomic poll counters.
//!
//! Incremented from the polling worker without allocations or blocking;
//! `Relaxed` ordering is sufficient because the counters are eventually
//! consistent metrics, not synchronization.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counter values returned by [`PollCounters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollCounterSnapshot {
    /// Completed poll cycles
    pub polls: u64,
    /// Cycles where the backend failed and stale data was kept
    pub backend_errors: u64,
    /// Cycles forced to a full refresh by the connection-change hook
    pub forced_refreshes: u64,
    /// Connect/disconnect events emitted to the observer
    pub slot_events: u64,
}

/// Lock-free counters for the polling worker.
#[derive(Debug, Default)]
pub struct PollCounters {
    polls: AtomicU64,
    backend_errors: AtomicU64,
    forced_refreshes: AtomicU64,
    slot_events: AtomicU64,
}

impl PollCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_poll(&self) {
        self.polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_backend_error(&self) {
        self.backend_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_forced_refresh(&self) {
        self.forced_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_slot_event(&self) {
        self.slot_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PollCounterSnapshot {
        PollCounterSnapshot {
            polls: self.polls.load(Ordering::Relaxed),
            backend_errors: self.backend_errors.load(Ordering::Relaxed),
            forced_refreshes: self.forced_refreshes.load(Ordering::Relaxed),
            slot_events: self.slot_events.load(Ordering::Relaxed),
        }
    }
}

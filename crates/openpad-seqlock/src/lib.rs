//! Lock-free seqlock cell for copy types.
//!
//! A single writer increments a sequence counter before and after mutating
//! the payload; readers copy the payload and retry until they observe a
//! stable, even counter value across the copy. Readers never block the
//! writer and the writer never blocks readers.
//!
//! The payload fields are deliberately not atomic: ordering is enforced
//! solely through the acquire/release pairs on the counter, and the retry
//! loop discards any torn copy.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free, single-writer/multi-reader snapshot cell.
///
/// The counter is odd exactly while a write is in progress. Only one
/// designated writer may call [`write`](SeqLock::write) or
/// [`update`](SeqLock::update); a second concurrent writer is a contract
/// violation and trips a `debug_assert!` in development builds.
pub struct SeqLock<T: Copy> {
    seq: AtomicU64,
    data: UnsafeCell<T>,
}

// SAFETY: Readers only ever copy the payload out, and the seqlock retry
// loop discards torn copies; the single-writer contract covers mutation.
unsafe impl<T: Copy + Send> Sync for SeqLock<T> {}

impl<T: Copy> SeqLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            seq: AtomicU64::new(0),
            data: UnsafeCell::new(value),
        }
    }

    /// Publish a whole new payload.
    ///
    /// Single-writer contract: must only be called from the one thread that
    /// owns the writer role for this cell.
    pub fn write(&self, value: T) {
        self.update(|slot| *slot = value);
    }

    /// Publish by mutating the payload in place.
    ///
    /// Avoids copying a large payload twice; the closure runs inside the
    /// odd-counter window, so it must be short and must not call back into
    /// this cell. Single-writer contract as for [`write`](SeqLock::write).
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let begin = self.seq.fetch_add(1, Ordering::Release);
        debug_assert!(begin % 2 == 0, "concurrent writer on SeqLock");
        // SAFETY: Single-writer guarantee; the odd sequence number prevents
        // readers from observing a torn write.
        unsafe {
            f(&mut *self.data.get());
        }
        self.seq.fetch_add(1, Ordering::Release);
    }

    /// Copy the current payload out, retrying until the copy is consistent.
    ///
    /// Never blocks and cannot fail; the retry window is bounded in practice
    /// by the writer's critical section, which is far shorter than the
    /// interval between writes.
    pub fn read(&self) -> T {
        loop {
            let start = self.seq.load(Ordering::Acquire);
            if start % 2 != 0 {
                std::hint::spin_loop();
                continue;
            }

            // SAFETY: T is Copy; the seqlock retry loop discards torn reads.
            let value = unsafe { *self.data.get() };
            let end = self.seq.load(Ordering::Acquire);
            if start == end {
                return value;
            }
        }
    }

    /// Current counter value; even exactly when no write is in progress.
    pub fn sequence(&self) -> u64 {
        self.seq.load(Ordering::Acquire)
    }
}

impl<T: Copy + std::fmt::Debug> std::fmt::Debug for SeqLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeqLock")
            .field("seq", &self.sequence())
            .field("data", &self.read())
            .finish()
    }
}

impl<T: Copy + Default> Default for SeqLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

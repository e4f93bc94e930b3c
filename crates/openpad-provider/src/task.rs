//! Cross-thread task posting seam.
//!
//! Gesture callbacks are delivered on the registrant's own executor, not on
//! the polling worker. The registrant hands over a [`TaskRunner`] describing
//! where its callback must run; the gate only ever calls
//! [`TaskRunner::post`], which must never block.

use std::sync::Arc;

/// A boxed one-shot closure posted across threads.
pub type Task = Box<dyn FnOnce() + Send>;

/// Destination for posted closures.
///
/// Implementations wrap an event loop, a channel, or any single-consumer
/// queue. The FIFO-per-target guarantee of the underlying queue is what
/// makes callback delivery ordered with respect to other work posted to the
/// same target.
pub trait TaskRunner: Send + Sync {
    /// Enqueue `task` for execution on this runner's target. Must not block.
    fn post(&self, task: Task);
}

/// Runs posted tasks inline on the posting thread.
///
/// Suitable for registrants without an event loop that accept their gesture
/// callback running on the polling worker.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateRunner;

impl TaskRunner for ImmediateRunner {
    fn post(&self, task: Task) {
        task();
    }
}

impl<R: TaskRunner + ?Sized> TaskRunner for Arc<R> {
    fn post(&self, task: Task) {
        (**self).post(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn immediate_runner_runs_inline() {
        let hits = Arc::new(AtomicU32::new(0));
        let runner = ImmediateRunner;
        let hits2 = Arc::clone(&hits);
        runner.post(Box::new(move || {
            hits2.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}

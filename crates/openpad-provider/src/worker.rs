//! Polling worker thread.
//!
//! One dedicated thread owns every piece of writer-side state: the backend,
//! the scratch snapshot, the slot tracker and the scheduling deadline.
//! Control requests (pause, resume, standby hints, teardown) arrive as
//! boxed tasks on a bounded channel; the pending poll deadline is expressed
//! through `recv_deadline`, so the thread stays responsive to control
//! traffic while a poll is scheduled. A poll is a timeout, not a sleep.

use crate::backend::PadBackend;
use crate::gesture::GestureGate;
use crate::stats::PollCounters;
use crate::tracker::{SlotObserver, SlotTracker};
use crossbeam::channel::{Receiver, RecvTimeoutError};
use openpad_seqlock::SeqLock;
use openpad_types::PadSnapshot;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Message consumed by the worker loop.
pub(crate) enum WorkerMessage {
    /// Run a control task on the worker thread.
    Run(Box<dyn FnOnce(&mut PollContext) + Send>),
    /// Stop the loop; the provider joins the thread afterwards.
    Shutdown,
}

/// Writer-side state, owned exclusively by the worker thread.
pub(crate) struct PollContext {
    pub backend: Box<dyn PadBackend>,
    /// Carries slot data across cycles so a failed poll leaves the
    /// previously reported values in place.
    pub scratch: PadSnapshot,
    pub tracker: SlotTracker,
    pub buffer: Arc<SeqLock<PadSnapshot>>,
    pub gate: Arc<GestureGate>,
    pub dirty: Arc<AtomicBool>,
    pub paused: Arc<Mutex<bool>>,
    pub observer: Option<Arc<dyn SlotObserver>>,
    pub counters: Arc<PollCounters>,
    pub interval: Duration,
    /// The one pending deadline; `None` means no poll is scheduled.
    pub next_poll: Option<Instant>,
}

impl PollContext {
    /// Schedule the next poll one interval from now. The interval is
    /// measured from now, not from the start of the previous cycle, so a
    /// slow backend delays the next poll instead of amplifying drift.
    /// No-op if a poll is already pending.
    pub fn arm(&mut self) {
        if self.next_poll.is_none() {
            self.next_poll = Some(Instant::now() + self.interval);
        }
    }

    /// Cancel the pending poll, if any.
    pub fn disarm(&mut self) {
        self.next_poll = None;
    }

    /// One complete poll cycle. Intra-cycle order is fixed: publish through
    /// the seqlock first, then diff, then evaluate the gesture gate.
    pub fn poll_cycle(&mut self) {
        let force_full = self.dirty.swap(false, Ordering::AcqRel);
        if force_full {
            self.counters.inc_forced_refresh();
            debug!("connection change noted; forcing full refresh");
        }

        if let Err(err) = self.backend.poll(force_full, &mut self.scratch) {
            // Transient: keep the previous slot data and retry next cycle.
            self.counters.inc_backend_error();
            debug!("backend poll failed, keeping previous slot data: {err}");
        }

        self.buffer.write(self.scratch);

        // Diffing stays suppressed until the gesture latch is set, so
        // pre-gesture connects are never observable.
        if self.gate.is_latched() {
            let tracker = &mut self.tracker;
            let observer = self.observer.as_deref();
            let counters = &self.counters;
            tracker.diff(&self.scratch, |event| {
                counters.inc_slot_event();
                debug!(?event, "slot topology change");
                if let Some(observer) = observer {
                    observer.on_slot_event(&event);
                }
            });
        }

        if self.gate.evaluate(&self.scratch) {
            // First gesture: current slot states become the diff baseline
            // rather than a burst of connect events.
            info!("user gesture observed; event reporting enabled");
            self.tracker.prime(&self.scratch);
        }

        self.counters.inc_poll();

        if !*self.paused.lock() {
            self.arm();
        }
    }
}

/// Worker thread entry point.
pub(crate) fn worker_main(mut ctx: PollContext, tasks: Receiver<WorkerMessage>) {
    debug!("polling worker started");

    loop {
        let message = match ctx.next_poll {
            Some(deadline) => match tasks.recv_deadline(deadline) {
                Ok(message) => Some(message),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match tasks.recv() {
                Ok(message) => Some(message),
                Err(_) => break,
            },
        };

        match message {
            Some(WorkerMessage::Run(task)) => task(&mut ctx),
            Some(WorkerMessage::Shutdown) => break,
            None => {
                // The deadline fired: Scheduled -> Polling, unless a pause
                // landed while the poll was pending.
                ctx.next_poll = None;
                if *ctx.paused.lock() {
                    debug!("poll deadline fired while paused; disarming");
                } else {
                    ctx.poll_cycle();
                }
            }
        }
    }

    debug!("polling worker stopped");
}

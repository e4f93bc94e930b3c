//! Provider facade.
//!
//! `PadProvider` is the externally visible owner object: it spawns and owns
//! the polling worker, the seqlock snapshot buffer, the slot tracker and
//! the gesture gate. Constructed once by the embedder and passed by
//! reference to consumers; there is no process-wide singleton.

use crate::backend::PadBackend;
use crate::error::ProviderError;
use crate::gesture::GestureGate;
use crate::stats::{PollCounterSnapshot, PollCounters};
use crate::task::{Task, TaskRunner};
use crate::tracker::{SlotObserver, SlotTracker};
use crate::worker::{worker_main, PollContext, WorkerMessage};
use crossbeam::channel::{bounded, Sender};
use openpad_seqlock::SeqLock;
use openpad_types::PadSnapshot;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Construction options for [`PadProvider::spawn`].
pub struct PollOptions {
    /// Fixed polling interval; floored at 100µs.
    pub interval: Duration,
    /// Name given to the worker thread.
    pub thread_name: String,
    /// Consumer of connect/disconnect events, if any.
    pub observer: Option<Arc<dyn SlotObserver>>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(4),
            thread_name: "openpad-poller".to_string(),
            observer: None,
        }
    }
}

impl std::fmt::Debug for PollOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollOptions")
            .field("interval", &self.interval)
            .field("thread_name", &self.thread_name)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Handle given to the OS hotplug notification; callable from any thread.
/// Setting it makes the next scheduled poll a full, non-incremental pass.
#[derive(Debug, Clone)]
pub struct ConnectionChangeHook {
    dirty: Arc<AtomicBool>,
}

impl ConnectionChangeHook {
    /// Mark the connection topology dirty. No payload: the next poll simply
    /// re-enumerates.
    pub fn notify(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

/// Cheap cloneable reader over the provider's snapshot buffer.
///
/// Clones map the same underlying buffer; nothing is copied until
/// [`read`](SnapshotReader::read). This is the shareable-handle seam: the
/// `#[repr(C)]` snapshot body is what an external memory-sharing
/// collaborator would map into another process.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    buffer: Arc<SeqLock<PadSnapshot>>,
}

impl SnapshotReader {
    /// Consistent copy of the current snapshot; never blocks.
    pub fn read(&self) -> PadSnapshot {
        self.buffer.read()
    }

    /// Current sequence counter; even exactly when no write is in progress.
    pub fn sequence(&self) -> u64 {
        self.buffer.sequence()
    }
}

/// Owner of the polling worker and all published state.
///
/// Starts in the stopped state; polling begins on the first
/// [`resume`](PadProvider::resume). Dropping the provider shuts the worker
/// down and joins it.
pub struct PadProvider {
    tasks: Sender<WorkerMessage>,
    worker: Option<JoinHandle<()>>,
    buffer: Arc<SeqLock<PadSnapshot>>,
    gate: Arc<GestureGate>,
    dirty: Arc<AtomicBool>,
    paused: Arc<Mutex<bool>>,
    counters: Arc<PollCounters>,
}

impl PadProvider {
    /// Spawn the polling worker around `backend`.
    pub fn spawn(
        backend: Box<dyn PadBackend>,
        options: PollOptions,
    ) -> Result<Self, ProviderError> {
        let interval = options.interval.max(Duration::from_micros(100));
        let buffer = Arc::new(SeqLock::new(PadSnapshot::zeroed()));
        let gate = Arc::new(GestureGate::new());
        let dirty = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(Mutex::new(true));
        let counters = Arc::new(PollCounters::new());
        let (tasks, task_rx) = bounded(64);

        let ctx = PollContext {
            backend,
            scratch: PadSnapshot::zeroed(),
            tracker: SlotTracker::new(),
            buffer: Arc::clone(&buffer),
            gate: Arc::clone(&gate),
            dirty: Arc::clone(&dirty),
            paused: Arc::clone(&paused),
            observer: options.observer,
            counters: Arc::clone(&counters),
            interval,
            next_poll: None,
        };

        let worker = thread::Builder::new()
            .name(options.thread_name.clone())
            .spawn(move || worker_main(ctx, task_rx))
            .map_err(ProviderError::SpawnFailed)?;

        info!(
            interval_us = interval.as_micros() as u64,
            thread = %options.thread_name,
            "pad provider started"
        );

        Ok(Self {
            tasks,
            worker: Some(worker),
            buffer,
            gate,
            dirty,
            paused,
            counters,
        })
    }

    /// Stop scheduling further polls. Idempotent; an in-flight cycle
    /// completes. The backend receives a standby hint on the worker thread.
    pub fn pause(&self) {
        {
            let mut paused = self.paused.lock();
            if *paused {
                return;
            }
            *paused = true;
        }
        debug!("pausing pad polling");
        self.post(|ctx| {
            ctx.disarm();
            ctx.backend.set_standby(true);
        });
    }

    /// Resume polling. No-op when already running; one `resume` undoes any
    /// number of `pause` calls.
    pub fn resume(&self) {
        {
            let mut paused = self.paused.lock();
            if !*paused {
                return;
            }
            *paused = false;
        }
        debug!("resuming pad polling");
        self.post(|ctx| {
            ctx.backend.set_standby(false);
            ctx.arm();
        });
    }

    /// Register a one-shot callback for the first user gesture, delivered
    /// on `runner`. Returns immediately; never blocks.
    pub fn register_for_gesture(
        &self,
        callback: impl FnOnce() + Send + 'static,
        runner: Arc<dyn TaskRunner>,
    ) {
        let callback: Task = Box::new(callback);
        self.gate.register(callback, runner);
    }

    /// Consistent copy of the current snapshot; callable from any thread.
    pub fn current_snapshot(&self) -> PadSnapshot {
        self.buffer.read()
    }

    /// Reader handle over the same buffer, for handing to consumers.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            buffer: Arc::clone(&self.buffer),
        }
    }

    /// Hook to hand to the OS hotplug notification source.
    pub fn connection_hook(&self) -> ConnectionChangeHook {
        ConnectionChangeHook {
            dirty: Arc::clone(&self.dirty),
        }
    }

    /// Whether the first user gesture has been observed.
    pub fn gesture_latched(&self) -> bool {
        self.gate.is_latched()
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock()
    }

    /// Current sequence counter of the snapshot buffer.
    pub fn sequence(&self) -> u64 {
        self.buffer.sequence()
    }

    /// Point-in-time view of the poll counters.
    pub fn counters(&self) -> PollCounterSnapshot {
        self.counters.snapshot()
    }

    fn post(&self, task: impl FnOnce(&mut PollContext) + Send + 'static) {
        if self
            .tasks
            .send(WorkerMessage::Run(Box::new(task)))
            .is_err()
        {
            warn!("polling worker is gone; dropping control task");
        }
    }
}

impl Drop for PadProvider {
    fn drop(&mut self) {
        let _ = self.tasks.send(WorkerMessage::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("polling worker panicked during shutdown");
            }
        }
        info!("pad provider stopped");
    }
}

impl std::fmt::Debug for PadProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PadProvider")
            .field("paused", &self.is_paused())
            .field("gesture_latched", &self.gesture_latched())
            .field("sequence", &self.sequence())
            .finish()
    }
}

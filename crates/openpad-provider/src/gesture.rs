//! One-way user gesture gate.
//!
//! Device data must not reach listeners until the user has produced a
//! deliberate interaction; raw idle readings (stick drift, resting
//! triggers) would otherwise allow silent device fingerprinting. The gate
//! latches on the first qualifying interaction and never resets for the
//! lifetime of the provider.

use crate::task::{Task, TaskRunner};
use openpad_types::PadSnapshot;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Axis/button magnitude that counts as a deliberate interaction.
pub const GESTURE_THRESHOLD: f32 = 0.5;

struct PendingGesture {
    callback: Task,
    runner: Arc<dyn TaskRunner>,
}

/// Latch plus the queue of callbacks awaiting the first gesture.
///
/// `register` is callable from any thread; `evaluate` runs only on the
/// polling worker, once per cycle. Pending callbacks are drained under the
/// queue lock but dispatched outside it, so a callback that re-enters the
/// gate cannot deadlock.
pub struct GestureGate {
    latched: AtomicBool,
    pending: Mutex<Vec<PendingGesture>>,
}

impl GestureGate {
    pub fn new() -> Self {
        Self {
            latched: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Whether a qualifying gesture has ever been observed.
    pub fn is_latched(&self) -> bool {
        self.latched.load(Ordering::Acquire)
    }

    /// Register a one-shot callback for the first gesture.
    ///
    /// If the latch is already set the callback is posted to `runner`
    /// immediately; otherwise it is queued. The latch is re-checked under
    /// the queue lock, so a registration racing the latch flip is either
    /// drained by `evaluate` or posted here, exactly once.
    pub fn register(&self, callback: Task, runner: Arc<dyn TaskRunner>) {
        if self.is_latched() {
            runner.post(callback);
            return;
        }

        let mut pending = self.pending.lock();
        if self.is_latched() {
            drop(pending);
            runner.post(callback);
            return;
        }
        pending.push(PendingGesture { callback, runner });
    }

    /// Inspect a freshly polled snapshot; flip the latch on the first
    /// qualifying interaction and flush the queue.
    ///
    /// Returns `true` only on the call that flipped the latch. A no-op
    /// forever afterwards.
    pub fn evaluate(&self, snapshot: &PadSnapshot) -> bool {
        if self.is_latched() {
            return false;
        }
        if !has_user_gesture(snapshot) {
            return false;
        }

        self.latched.store(true, Ordering::Release);
        let drained = {
            let mut pending = self.pending.lock();
            std::mem::take(&mut *pending)
        };
        for PendingGesture { callback, runner } in drained {
            runner.post(callback);
        }
        true
    }
}

impl Default for GestureGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure gesture predicate: any connected slot with an axis or button
/// magnitude above [`GESTURE_THRESHOLD`].
pub fn has_user_gesture(snapshot: &PadSnapshot) -> bool {
    snapshot.slots.iter().filter(|s| s.connected).any(|s| {
        let axes = &s.axes[..(s.axis_count as usize).min(s.axes.len())];
        let buttons = &s.buttons[..(s.button_count as usize).min(s.buttons.len())];
        axes.iter().any(|a| a.abs() > GESTURE_THRESHOLD)
            || buttons.iter().any(|b| b.abs() > GESTURE_THRESHOLD)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ImmediateRunner;
    use openpad_types::PadSlot;
    use std::sync::atomic::AtomicU32;

    fn snapshot_with(slot0: PadSlot) -> PadSnapshot {
        let mut snap = PadSnapshot::new();
        snap.slots[0] = slot0;
        snap
    }

    fn pressed_pad() -> PadSnapshot {
        snapshot_with(PadSlot::new().with_connected(true).with_buttons(&[0.9]))
    }

    fn idle_pad() -> PadSnapshot {
        snapshot_with(
            PadSlot::new()
                .with_connected(true)
                .with_axes(&[0.1, -0.2])
                .with_buttons(&[0.0, 0.3]),
        )
    }

    #[test]
    fn idle_readings_do_not_qualify() {
        assert!(!has_user_gesture(&idle_pad()));
        assert!(!has_user_gesture(&PadSnapshot::new()));
    }

    #[test]
    fn threshold_is_exclusive() {
        let at = snapshot_with(PadSlot::new().with_connected(true).with_buttons(&[0.5]));
        assert!(!has_user_gesture(&at));
        let above = snapshot_with(PadSlot::new().with_connected(true).with_buttons(&[0.51]));
        assert!(has_user_gesture(&above));
    }

    #[test]
    fn negative_axis_deflection_qualifies() {
        let snap = snapshot_with(PadSlot::new().with_connected(true).with_axes(&[-0.8]));
        assert!(has_user_gesture(&snap));
    }

    #[test]
    fn disconnected_slot_never_qualifies() {
        let snap = snapshot_with(PadSlot::new().with_connected(false).with_buttons(&[1.0]));
        assert!(!has_user_gesture(&snap));
    }

    #[test]
    fn evaluate_flips_once_and_flushes_queue() {
        let gate = GestureGate::new();
        let hits = Arc::new(AtomicU32::new(0));

        let hits2 = Arc::clone(&hits);
        gate.register(
            Box::new(move || {
                hits2.fetch_add(1, Ordering::SeqCst);
            }),
            Arc::new(ImmediateRunner),
        );
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        assert!(!gate.evaluate(&idle_pad()));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        assert!(gate.evaluate(&pressed_pad()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(gate.is_latched());

        // Latched: further evaluation is a no-op and never re-delivers.
        assert!(!gate.evaluate(&pressed_pad()));
        assert!(!gate.evaluate(&idle_pad()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registration_after_latch_posts_immediately() {
        let gate = GestureGate::new();
        assert!(gate.evaluate(&pressed_pad()));

        let hits = Arc::new(AtomicU32::new(0));
        let hits2 = Arc::clone(&hits);
        gate.register(
            Box::new(move || {
                hits2.fetch_add(1, Ordering::SeqCst);
            }),
            Arc::new(ImmediateRunner),
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reentrant_callback_does_not_deadlock() {
        let gate = Arc::new(GestureGate::new());
        let hits = Arc::new(AtomicU32::new(0));

        let gate2 = Arc::clone(&gate);
        let hits2 = Arc::clone(&hits);
        gate.register(
            Box::new(move || {
                // Re-enter the gate from inside the flush.
                let hits3 = Arc::clone(&hits2);
                gate2.register(
                    Box::new(move || {
                        hits3.fetch_add(10, Ordering::SeqCst);
                    }),
                    Arc::new(ImmediateRunner),
                );
                hits2.fetch_add(1, Ordering::SeqCst);
            }),
            Arc::new(ImmediateRunner),
        );

        assert!(gate.evaluate(&pressed_pad()));
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }
}

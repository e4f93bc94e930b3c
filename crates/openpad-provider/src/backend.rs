//! Device backend boundary.
//!
//! The backend is the OS-specific collaborator that reads raw device state.
//! It is driven exclusively from the polling worker thread; one
//! implementation is selected at provider construction, behind a trait
//! object so platforms can be swapped without touching the worker.

use crate::error::BackendError;
use openpad_types::PadSnapshot;

/// Source of raw device state, polled once per cycle.
///
/// `out` arrives holding the previous cycle's contents. Implementations
/// must zero-fill the unused axis/button entries of every slot they touch
/// (the [`openpad_types::PadSlot`] setters do this) and may leave slots
/// they have nothing new for untouched; stale-but-valid data is the
/// intended degradation mode.
///
/// Contract:
/// - called only from the polling worker thread
/// - must not block longer than a small multiple of the polling interval
/// - a `force_full` pass follows a connection-topology notification and
///   must re-enumerate rather than poll incrementally
pub trait PadBackend: Send {
    /// Fill `out` with fresh device state.
    fn poll(&mut self, force_full: bool, out: &mut PadSnapshot) -> Result<(), BackendError>;

    /// Power hint: `true` while the provider is paused. Backends that can
    /// put hardware to sleep should do so here.
    fn set_standby(&mut self, standby: bool) {
        let _ = standby;
    }
}

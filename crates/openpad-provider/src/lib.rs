//! Periodic gamepad polling service.
//!
//! A dedicated worker thread polls a swappable [`PadBackend`] at a fixed
//! interval and publishes a fixed-layout [`openpad_types::PadSnapshot`]
//! through a sequence lock, so any number of readers on any thread copy a
//! consistent snapshot without ever blocking the writer.
//!
//! Two privacy/topology mechanisms sit on top of the loop:
//!
//! - the [`GestureGate`] suppresses connect/disconnect event reporting
//!   until the user has produced a deliberate interaction, so idle device
//!   readings cannot be used for silent fingerprinting;
//! - the [`SlotTracker`] turns level-triggered polling into edge-triggered
//!   connect/disconnect events, with an external hotplug hook forcing full
//!   re-enumeration passes.
//!
//! The [`PadProvider`] facade owns all of it: `pause`/`resume` lifecycle,
//! gesture registration, snapshot reads and the cloneable
//! [`SnapshotReader`] handle backed by the same buffer.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod error;
pub mod gesture;
pub mod prelude;
pub mod provider;
pub mod stats;
pub mod task;
pub mod tracker;

mod worker;

pub use backend::PadBackend;
pub use error::{BackendError, ProviderError};
pub use gesture::{has_user_gesture, GestureGate, GESTURE_THRESHOLD};
pub use provider::{ConnectionChangeHook, PadProvider, PollOptions, SnapshotReader};
pub use stats::{PollCounterSnapshot, PollCounters};
pub use task::{ImmediateRunner, Task, TaskRunner};
pub use tracker::{SlotEvent, SlotObserver, SlotTracker};

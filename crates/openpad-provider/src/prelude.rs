//! Convenience re-exports for provider consumers.

pub use crate::backend::PadBackend;
pub use crate::error::{BackendError, ProviderError};
pub use crate::gesture::GESTURE_THRESHOLD;
pub use crate::provider::{ConnectionChangeHook, PadProvider, PollOptions, SnapshotReader};
pub use crate::stats::PollCounterSnapshot;
pub use crate::task::{ImmediateRunner, Task, TaskRunner};
pub use crate::tracker::{SlotEvent, SlotObserver};
pub use openpad_types::{PadSlot, PadSnapshot, MAX_AXES, MAX_BUTTONS, MAX_SLOTS};

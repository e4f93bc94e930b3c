//! Connection-transition tracking.
//!
//! The tracker remembers, per slot, the identity and capability signature
//! that was last reported to observers, and diffs it against each freshly
//! polled snapshot. It is writer-thread-private state: only the polling
//! worker touches it, and nothing here is visible to snapshot readers.

use openpad_types::{PadSlot, PadSnapshot, IDENT_LEN, MAPPING_LEN, MAX_SLOTS};

/// Cached per-slot identity/capability tuple used purely for change
/// detection. Axis and button values are deliberately absent: value churn
/// is not a topology change.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SlotSignature {
    connected: bool,
    axis_count: u8,
    button_count: u8,
    ident: [u8; IDENT_LEN],
    mapping: [u8; MAPPING_LEN],
}

impl SlotSignature {
    const fn empty() -> Self {
        Self {
            connected: false,
            axis_count: 0,
            button_count: 0,
            ident: [0; IDENT_LEN],
            mapping: [0; MAPPING_LEN],
        }
    }

    fn of(slot: &PadSlot) -> Self {
        Self {
            connected: slot.connected,
            axis_count: slot.axis_count,
            button_count: slot.button_count,
            ident: slot.ident,
            mapping: slot.mapping,
        }
    }
}

/// A connect or disconnect transition on one slot.
///
/// A capability or identity change on a slot that stays connected is
/// reported as a synthesized `Disconnected` + `Connected` pair in the same
/// cycle: the old device is gone as far as consumers are concerned, even if
/// the slot index survived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotEvent {
    /// A device appeared on `slot`.
    Connected {
        /// Slot index (stable while the device stays connected)
        slot: usize,
        /// Published state at the moment of connection
        pad: PadSlot,
    },
    /// The device on `slot` went away.
    Disconnected {
        /// Slot index that was vacated
        slot: usize,
    },
}

impl SlotEvent {
    pub fn slot(&self) -> usize {
        match *self {
            SlotEvent::Connected { slot, .. } => slot,
            SlotEvent::Disconnected { slot } => slot,
        }
    }
}

/// Consumer of connect/disconnect events, registered at provider
/// construction. Called from the polling worker thread; implementations
/// must not block.
pub trait SlotObserver: Send + Sync {
    fn on_slot_event(&self, event: &SlotEvent);
}

/// Per-slot signature memory plus the diff that synthesizes events.
pub struct SlotTracker {
    signatures: [SlotSignature; MAX_SLOTS],
}

impl SlotTracker {
    pub fn new() -> Self {
        Self {
            signatures: [SlotSignature::empty(); MAX_SLOTS],
        }
    }

    /// Capture `snapshot` as the baseline without emitting events.
    ///
    /// Used once, right after the gesture latch first flips, so that slot
    /// states that existed before the gesture are not reported as spurious
    /// connects.
    pub fn prime(&mut self, snapshot: &PadSnapshot) {
        for (signature, slot) in self.signatures.iter_mut().zip(snapshot.slots.iter()) {
            *signature = SlotSignature::of(slot);
        }
    }

    /// Diff `snapshot` against the remembered signatures, emitting one
    /// event per transition, then update the signatures to match.
    pub fn diff(&mut self, snapshot: &PadSnapshot, mut emit: impl FnMut(SlotEvent)) {
        for (index, (signature, slot)) in self
            .signatures
            .iter_mut()
            .zip(snapshot.slots.iter())
            .enumerate()
        {
            let next = SlotSignature::of(slot);
            if *signature == next {
                continue;
            }

            match (signature.connected, next.connected) {
                (false, true) => emit(SlotEvent::Connected {
                    slot: index,
                    pad: *slot,
                }),
                (true, false) => emit(SlotEvent::Disconnected { slot: index }),
                (true, true) => {
                    emit(SlotEvent::Disconnected { slot: index });
                    emit(SlotEvent::Connected {
                        slot: index,
                        pad: *slot,
                    });
                }
                // Signature churn on a slot nobody was connected to.
                (false, false) => {}
            }

            *signature = next;
        }
    }
}

impl Default for SlotTracker {
    fn default() -> Self {
        Self::new()
    }
}

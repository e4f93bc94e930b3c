//! Fixed-layout gamepad types for the OpenPad snapshot service
//!
//! This crate defines the slot and snapshot records published by the polling
//! worker. The layout is `#[repr(C)]`, fixed-size and fixed-offset with no
//! variable-length fields, so the snapshot body can be shared across a
//! process boundary as raw mapped memory.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

/// Number of device slots tracked by a provider.
pub const MAX_SLOTS: usize = 4;

/// Maximum axes reported per slot.
pub const MAX_AXES: usize = 16;

/// Maximum buttons reported per slot.
pub const MAX_BUTTONS: usize = 32;

/// Length of the fixed identity buffer (vendor/product string, UTF-8).
pub const IDENT_LEN: usize = 64;

/// Length of the fixed mapping-tag buffer (e.g. `standard`).
pub const MAPPING_LEN: usize = 16;

/// State of one device slot.
///
/// A slot index is the device's stable identity for the lifetime of its
/// connection. Entries beyond `axis_count`/`button_count` are always zero;
/// the mutation helpers below are the only writers and they enforce it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadSlot {
    pub connected: bool,
    pub axis_count: u8,
    pub button_count: u8,
    pub axes: [f32; MAX_AXES],
    pub buttons: [f32; MAX_BUTTONS],
    pub ident: [u8; IDENT_LEN],
    pub mapping: [u8; MAPPING_LEN],
}

impl PadSlot {
    /// Disconnected slot with every field zeroed.
    pub const fn zeroed() -> Self {
        Self {
            connected: false,
            axis_count: 0,
            button_count: 0,
            axes: [0.0; MAX_AXES],
            buttons: [0.0; MAX_BUTTONS],
            ident: [0; IDENT_LEN],
            mapping: [0; MAPPING_LEN],
        }
    }

    pub fn new() -> Self {
        Self::zeroed()
    }

    /// Copy axis values in, truncating to [`MAX_AXES`] and zero-filling the
    /// remainder.
    pub fn set_axes(&mut self, values: &[f32]) {
        let n = values.len().min(MAX_AXES);
        self.axes[..n].copy_from_slice(&values[..n]);
        self.axes[n..].fill(0.0);
        self.axis_count = n as u8;
    }

    /// Copy button values in, truncating to [`MAX_BUTTONS`] and zero-filling
    /// the remainder.
    pub fn set_buttons(&mut self, values: &[f32]) {
        let n = values.len().min(MAX_BUTTONS);
        self.buttons[..n].copy_from_slice(&values[..n]);
        self.buttons[n..].fill(0.0);
        self.button_count = n as u8;
    }

    /// Copy an identity string in, truncating to [`IDENT_LEN`] bytes and
    /// zero-filling the remainder.
    pub fn set_ident(&mut self, ident: &[u8]) {
        let n = ident.len().min(IDENT_LEN);
        self.ident[..n].copy_from_slice(&ident[..n]);
        self.ident[n..].fill(0);
    }

    /// Copy a mapping tag in, truncating to [`MAPPING_LEN`] bytes and
    /// zero-filling the remainder.
    pub fn set_mapping(&mut self, mapping: &[u8]) {
        let n = mapping.len().min(MAPPING_LEN);
        self.mapping[..n].copy_from_slice(&mapping[..n]);
        self.mapping[n..].fill(0);
    }

    /// Reset the slot to the zeroed, disconnected state.
    pub fn clear(&mut self) {
        *self = Self::zeroed();
    }

    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    pub fn with_axes(mut self, values: &[f32]) -> Self {
        self.set_axes(values);
        self
    }

    pub fn with_buttons(mut self, values: &[f32]) -> Self {
        self.set_buttons(values);
        self
    }

    pub fn with_ident(mut self, ident: &[u8]) -> Self {
        self.set_ident(ident);
        self
    }

    pub fn with_mapping(mut self, mapping: &[u8]) -> Self {
        self.set_mapping(mapping);
        self
    }

    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    pub fn button(&self, index: usize) -> f32 {
        self.buttons.get(index).copied().unwrap_or(0.0)
    }

    /// Identity buffer as a lossy UTF-8 string, trailing zeros stripped.
    pub fn ident_str(&self) -> std::borrow::Cow<'_, str> {
        let end = self
            .ident
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(IDENT_LEN);
        String::from_utf8_lossy(&self.ident[..end])
    }

    /// Mapping buffer as a lossy UTF-8 string, trailing zeros stripped.
    pub fn mapping_str(&self) -> std::borrow::Cow<'_, str> {
        let end = self
            .mapping
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAPPING_LEN);
        String::from_utf8_lossy(&self.mapping[..end])
    }
}

impl Default for PadSlot {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Published state of every slot.
///
/// The slot array is the only field; the surrounding sequence counter lives
/// in `openpad-seqlock` so the body itself stays a plain mappable block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadSnapshot {
    pub slots: [PadSlot; MAX_SLOTS],
}

impl PadSnapshot {
    pub const fn zeroed() -> Self {
        Self {
            slots: [PadSlot::zeroed(); MAX_SLOTS],
        }
    }

    pub fn new() -> Self {
        Self::zeroed()
    }

    pub fn slot(&self, index: usize) -> Option<&PadSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut PadSlot> {
        self.slots.get_mut(index)
    }

    pub fn connected_count(&self) -> usize {
        self.slots.iter().filter(|s| s.connected).count()
    }
}

impl Default for PadSnapshot {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[cfg(feature = "proptest")]
mod proptest_impls {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    impl Arbitrary for PadSlot {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            (
                any::<bool>(),
                vec(-1.0f32..=1.0, 0..=MAX_AXES),
                vec(0.0f32..=1.0, 0..=MAX_BUTTONS),
                vec(any::<u8>(), 0..=IDENT_LEN),
                vec(any::<u8>(), 0..=MAPPING_LEN),
            )
                .prop_map(|(connected, axes, buttons, ident, mapping)| {
                    PadSlot::new()
                        .with_connected(connected)
                        .with_axes(&axes)
                        .with_buttons(&buttons)
                        .with_ident(&ident)
                        .with_mapping(&mapping)
                })
                .boxed()
        }
    }

    impl Arbitrary for PadSnapshot {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            proptest::array::uniform4(any::<PadSlot>())
                .prop_map(|slots| PadSnapshot { slots })
                .boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_slot_is_disconnected_and_blank() {
        let slot = PadSlot::zeroed();
        assert!(!slot.connected);
        assert_eq!(slot.axis_count, 0);
        assert_eq!(slot.button_count, 0);
        assert!(slot.axes.iter().all(|&a| a == 0.0));
        assert!(slot.buttons.iter().all(|&b| b == 0.0));
        assert_eq!(slot.ident_str(), "");
    }

    #[test]
    fn set_axes_zero_fills_unused_entries() {
        let mut slot = PadSlot::new();
        slot.set_axes(&[0.5; MAX_AXES]);
        slot.set_axes(&[0.25, -0.75]);

        assert_eq!(slot.axis_count, 2);
        assert_eq!(slot.axes[0], 0.25);
        assert_eq!(slot.axes[1], -0.75);
        assert!(slot.axes[2..].iter().all(|&a| a == 0.0));
    }

    #[test]
    fn set_buttons_zero_fills_unused_entries() {
        let mut slot = PadSlot::new();
        slot.set_buttons(&[1.0; MAX_BUTTONS]);
        slot.set_buttons(&[0.9]);

        assert_eq!(slot.button_count, 1);
        assert_eq!(slot.buttons[0], 0.9);
        assert!(slot.buttons[1..].iter().all(|&b| b == 0.0));
    }

    #[test]
    fn set_axes_truncates_oversized_input() {
        let mut slot = PadSlot::new();
        slot.set_axes(&[0.1; MAX_AXES + 8]);
        assert_eq!(slot.axis_count as usize, MAX_AXES);
    }

    #[test]
    fn ident_round_trips_and_truncates() {
        let mut slot = PadSlot::new();
        slot.set_ident(b"Example Pad (Vendor: 045e Product: 028e)");
        assert_eq!(slot.ident_str(), "Example Pad (Vendor: 045e Product: 028e)");

        let long = [b'x'; IDENT_LEN + 10];
        slot.set_ident(&long);
        assert_eq!(slot.ident_str().len(), IDENT_LEN);
    }

    #[test]
    fn clear_resets_everything() {
        let mut slot = PadSlot::new()
            .with_connected(true)
            .with_axes(&[1.0])
            .with_ident(b"pad");
        slot.clear();
        assert_eq!(slot, PadSlot::zeroed());
    }

    #[test]
    fn snapshot_layout_is_fixed() {
        // Mapped-memory contract: repr(C), no padding surprises. The slot is
        // 3 header bytes + 1 pad + 16 axes + 32 buttons + 64 ident + 16
        // mapping.
        assert_eq!(std::mem::size_of::<PadSlot>(), 276);
        assert_eq!(std::mem::align_of::<PadSlot>(), 4);
        assert_eq!(
            std::mem::size_of::<PadSnapshot>(),
            MAX_SLOTS * std::mem::size_of::<PadSlot>()
        );
    }

    #[test]
    fn connected_count_counts_connected_slots() {
        let mut snap = PadSnapshot::new();
        assert_eq!(snap.connected_count(), 0);
        snap.slots[0].connected = true;
        snap.slots[3].connected = true;
        assert_eq!(snap.connected_count(), 2);
    }

    #[test]
    fn slot_accessors_bounds_check() {
        let snap = PadSnapshot::new();
        assert!(snap.slot(MAX_SLOTS - 1).is_some());
        assert!(snap.slot(MAX_SLOTS).is_none());
    }
}

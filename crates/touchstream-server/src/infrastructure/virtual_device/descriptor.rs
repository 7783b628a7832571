//! Device capability descriptor.
//!
//! Declares everything the virtual touchscreen registers with the kernel:
//! axis ranges, the button/key set, the input property, and the device
//! identity.  Built once at startup and consumed by the uinput backend's
//! creation step — never re-derived per event.

use touchstream_core::{keymap, MAX_TOUCH_SLOTS, STREAM_HEIGHT, STREAM_WIDTH};

/// Capability set of the virtual multi-touch device.
///
/// Axis list: single-touch X/Y (for non-multitouch consumers), the slot
/// axis, the tracking-id axis (with `-1` as the cleared sentinel), and the
/// multi-touch position axes.  The `DIRECT` input property makes the
/// consumer treat the device as a touchscreen rather than a trackpad.
#[derive(Debug, Clone)]
pub struct TouchscreenDescriptor {
    /// Device name reported to the kernel.
    pub name: String,
    /// Inclusive X axis maximum (`width - 1`).
    pub x_max: i32,
    /// Inclusive Y axis maximum (`height - 1`).
    pub y_max: i32,
    /// Inclusive slot axis maximum (`MAX_TOUCH_SLOTS - 1`).
    pub slot_max: i32,
    /// Registered keyboard keys, in addition to the digitizer touch button.
    pub keyboard_keys: &'static [u16],
    /// USB vendor id reported to the kernel.
    pub vendor: u16,
    /// USB product id reported to the kernel.
    pub product: u16,
}

impl TouchscreenDescriptor {
    /// Builds the descriptor for a streamed surface of `width` × `height`.
    pub fn new(name: &str, width: i32, height: i32) -> Self {
        Self {
            name: name.to_string(),
            x_max: width - 1,
            y_max: height - 1,
            slot_max: i32::from(MAX_TOUCH_SLOTS) - 1,
            keyboard_keys: keymap::KEYBOARD_KEYS,
            vendor: 0x1234,
            product: 0x5678,
        }
    }

    /// Tracking-id axis minimum: `-1` is the cleared sentinel.
    pub fn tracking_id_min(&self) -> i32 {
        -1
    }

    /// Tracking-id axis maximum, matching the slot bound.
    pub fn tracking_id_max(&self) -> i32 {
        self.slot_max
    }
}

impl Default for TouchscreenDescriptor {
    fn default() -> Self {
        Self::new("touchstream-touch", STREAM_WIDTH, STREAM_HEIGHT)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

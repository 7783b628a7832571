//! Typed representation of the 13-byte input event record.
//!
//! One [`InputEvent`] is the unit of the entire back-channel: the viewer
//! encodes them, every transport carries them unchanged, and the injector
//! consumes them.  The record is versionless — compatibility is maintained by
//! only ever appending semantics to the unused `arg4` field, never changing
//! an existing field's meaning.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Size of one encoded event record in bytes.
pub const EVENT_SIZE: usize = 13;

/// The five event kinds understood by the injector.
///
/// The wire field is a raw `u8`; values outside this set decode successfully
/// (the codec is format-agnostic) and are dropped at the injector boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    /// Finger drag: arg1 = absolute X, arg2 = absolute Y, arg3 = slot.
    TouchMove = 0,
    /// Finger contact begins: arg1 = X, arg2 = Y, arg3 = slot.
    TouchDown = 1,
    /// Finger lifts: arg3 = slot (coordinates ignored).
    TouchUp = 2,
    /// Key press: arg1 = Linux evdev keycode.
    KeyDown = 3,
    /// Key release: arg1 = Linux evdev keycode.
    KeyUp = 4,
}

impl TryFrom<u8> for EventKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EventKind::TouchMove),
            1 => Ok(EventKind::TouchDown),
            2 => Ok(EventKind::TouchUp),
            3 => Ok(EventKind::KeyDown),
            4 => Ok(EventKind::KeyUp),
            other => Err(other),
        }
    }
}

/// One decoded input event.
///
/// `kind` is kept as the raw wire byte so that unknown kinds survive a
/// decode/encode round trip; use [`InputEvent::kind`] to interpret it.
///
/// `timestamp_ms` is a producer-local millisecond counter that wraps
/// silently.  It is diagnostic only — the injector never uses it for
/// ordering decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Raw event kind byte (see [`EventKind`]).
    pub kind: u8,
    /// Producer-local monotonic milliseconds, wrapping at `u32::MAX`.
    pub timestamp_ms: u32,
    pub arg1: i16,
    pub arg2: i16,
    pub arg3: i16,
    pub arg4: i16,
}

impl InputEvent {
    /// Interprets the raw kind byte, or returns it unchanged if unknown.
    pub fn kind(&self) -> Result<EventKind, u8> {
        EventKind::try_from(self.kind)
    }

    /// Builds a `TouchMove` event for `slot` at `(x, y)`.
    pub fn touch_move(x: i16, y: i16, slot: i16) -> Self {
        Self::new(EventKind::TouchMove, x, y, slot)
    }

    /// Builds a `TouchDown` event for `slot` at `(x, y)`.
    pub fn touch_down(x: i16, y: i16, slot: i16) -> Self {
        Self::new(EventKind::TouchDown, x, y, slot)
    }

    /// Builds a `TouchUp` event for `slot`.
    ///
    /// Coordinates are carried for symmetry with legacy senders but ignored
    /// by the injector.
    pub fn touch_up(x: i16, y: i16, slot: i16) -> Self {
        Self::new(EventKind::TouchUp, x, y, slot)
    }

    /// Builds a `KeyDown` event for the given evdev keycode.
    pub fn key_down(code: u16) -> Self {
        Self::new(EventKind::KeyDown, code as i16, 0, 0)
    }

    /// Builds a `KeyUp` event for the given evdev keycode.
    pub fn key_up(code: u16) -> Self {
        Self::new(EventKind::KeyUp, code as i16, 0, 0)
    }

    fn new(kind: EventKind, arg1: i16, arg2: i16, arg3: i16) -> Self {
        Self {
            kind: kind as u8,
            timestamp_ms: timestamp_now_ms(),
            arg1,
            arg2,
            arg3,
            arg4: 0,
        }
    }
}

/// Returns the current wall-clock time in milliseconds, truncated to 32 bits.
///
/// The field wraps roughly every 49 days; receivers must never compare
/// timestamps across producers or use them for ordering.
pub fn timestamp_now_ms() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_try_from_maps_all_wire_values() {
        assert_eq!(EventKind::try_from(0), Ok(EventKind::TouchMove));
        assert_eq!(EventKind::try_from(1), Ok(EventKind::TouchDown));
        assert_eq!(EventKind::try_from(2), Ok(EventKind::TouchUp));
        assert_eq!(EventKind::try_from(3), Ok(EventKind::KeyDown));
        assert_eq!(EventKind::try_from(4), Ok(EventKind::KeyUp));
    }

    #[test]
    fn test_event_kind_try_from_rejects_unknown_values() {
        assert_eq!(EventKind::try_from(5), Err(5));
        assert_eq!(EventKind::try_from(0xFF), Err(0xFF));
    }

    #[test]
    fn test_touch_down_constructor_sets_fields() {
        // Arrange / Act
        let event = InputEvent::touch_down(100, 200, 3);

        // Assert
        assert_eq!(event.kind(), Ok(EventKind::TouchDown));
        assert_eq!(event.arg1, 100);
        assert_eq!(event.arg2, 200);
        assert_eq!(event.arg3, 3);
        assert_eq!(event.arg4, 0);
    }

    #[test]
    fn test_key_down_constructor_carries_keycode_in_arg1() {
        let event = InputEvent::key_down(28); // KEY_ENTER
        assert_eq!(event.kind(), Ok(EventKind::KeyDown));
        assert_eq!(event.arg1, 28);
    }

    #[test]
    fn test_unknown_kind_is_preserved_raw() {
        let event = InputEvent {
            kind: 9,
            timestamp_ms: 0,
            arg1: 0,
            arg2: 0,
            arg3: 0,
            arg4: 0,
        };
        assert_eq!(event.kind(), Err(9));
    }

    #[test]
    fn test_timestamp_now_ms_is_nonzero() {
        assert!(timestamp_now_ms() > 0);
    }
}

//! Binary codec for the fixed-size input event record.
//!
//! Wire format, little-endian, no padding:
//! ```text
//! | offset | size | field          |
//! |--------|------|----------------|
//! | 0      | 1    | kind (u8)      |
//! | 1      | 4    | timestamp (u32)|
//! | 5      | 2    | arg1 (i16)     |
//! | 7      | 2    | arg2 (i16)     |
//! | 9      | 2    | arg3 (i16)     |
//! | 11     | 2    | arg4 (i16)     |
//! ```
//! Total record size: 13 bytes.  A datagram or message frame is a sequence of
//! back-to-back records; [`decode_frame`] splits it greedily and discards any
//! trailing partial tail.
//!
//! The codec is format-agnostic about the kind byte: unknown kinds decode
//! successfully and are rejected later at the injector boundary.

use thiserror::Error;

use crate::protocol::event::{InputEvent, EVENT_SIZE};

/// Errors that can occur while decoding an event record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The byte slice is shorter than one full record.
    #[error("truncated event record: need at least {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },
}

/// Encodes an [`InputEvent`] into its 13-byte wire form.
///
/// # Examples
///
/// ```rust
/// use touchstream_core::{decode_event, encode_event, InputEvent};
///
/// let event = InputEvent::touch_down(100, 200, 0);
/// let bytes = encode_event(&event);
/// assert_eq!(decode_event(&bytes).unwrap(), event);
/// ```
pub fn encode_event(event: &InputEvent) -> [u8; EVENT_SIZE] {
    let mut buf = [0u8; EVENT_SIZE];
    buf[0] = event.kind;
    buf[1..5].copy_from_slice(&event.timestamp_ms.to_le_bytes());
    buf[5..7].copy_from_slice(&event.arg1.to_le_bytes());
    buf[7..9].copy_from_slice(&event.arg2.to_le_bytes());
    buf[9..11].copy_from_slice(&event.arg3.to_le_bytes());
    buf[11..13].copy_from_slice(&event.arg4.to_le_bytes());
    buf
}

/// Decodes one [`InputEvent`] from the beginning of `bytes`.
///
/// Exactly [`EVENT_SIZE`] bytes are consumed; extra bytes are ignored so the
/// caller can advance its own cursor.
///
/// # Errors
///
/// Returns [`FormatError::Truncated`] when fewer than 13 bytes are available.
pub fn decode_event(bytes: &[u8]) -> Result<InputEvent, FormatError> {
    if bytes.len() < EVENT_SIZE {
        return Err(FormatError::Truncated {
            needed: EVENT_SIZE,
            available: bytes.len(),
        });
    }
    Ok(InputEvent {
        kind: bytes[0],
        timestamp_ms: u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]),
        arg1: i16::from_le_bytes([bytes[5], bytes[6]]),
        arg2: i16::from_le_bytes([bytes[7], bytes[8]]),
        arg3: i16::from_le_bytes([bytes[9], bytes[10]]),
        arg4: i16::from_le_bytes([bytes[11], bytes[12]]),
    })
}

/// Greedily decodes every whole record in `frame`, in order.
///
/// Trailing bytes that do not form a whole record are discarded without
/// error — a sender may legitimately batch several records per datagram, and
/// an unreliable transport may truncate the tail.
pub fn decode_frame(frame: &[u8]) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(frame.len() / EVENT_SIZE);
    let mut offset = 0;
    while offset + EVENT_SIZE <= frame.len() {
        // Slice length is checked by the loop condition, so decode cannot fail.
        if let Ok(event) = decode_event(&frame[offset..offset + EVENT_SIZE]) {
            events.push(event);
        }
        offset += EVENT_SIZE;
    }
    events
}

// ── Tests ─────────────────────────────────────────────────────────────────────

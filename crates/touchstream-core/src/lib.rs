//! # touchstream-core
//!
//! Shared library for the touchstream input back-channel containing the
//! binary event codec, the event types, and the keyboard keycode tables.
//!
//! This crate is used by the server and by any Rust sender.  It has zero
//! dependencies on OS APIs, device handles, or network sockets.
//!
//! # Protocol overview (for beginners)
//!
//! Touchstream streams a remote game session to a viewer and carries the
//! viewer's touches and key presses back to the host as synthetic input.
//! The back-channel is deliberately tiny: every event — finger down, finger
//! move, finger up, key down, key up — is one fixed 13-byte record.  A
//! datagram or message frame may carry several records back to back.
//!
//! This crate (`touchstream-core`) defines:
//!
//! - **`protocol`** – The 13-byte little-endian wire record, the typed
//!   [`InputEvent`] it decodes into, and the greedy frame decoder that splits
//!   a buffer into whole records.
//!
//! - **`keymap`** – The fixed set of Linux evdev keycodes the virtual device
//!   registers, shared between the device descriptor and the key-event
//!   validation path.

pub mod keymap;
pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `touchstream_core::InputEvent` instead of the full module path.
pub use protocol::codec::{decode_event, decode_frame, encode_event, FormatError};
pub use protocol::event::{EventKind, InputEvent, EVENT_SIZE};

/// Horizontal resolution of the streamed surface, in device pixels.
///
/// Senders map their pointer coordinates into this space; the injector clamps
/// anything outside it.
pub const STREAM_WIDTH: i32 = 1280;

/// Vertical resolution of the streamed surface, in device pixels.
pub const STREAM_HEIGHT: i32 = 720;

/// Number of concurrently tracked touch contacts (multi-touch slots).
pub const MAX_TOUCH_SLOTS: i16 = 10;

/// Default UDP port for the datagram ingress.
pub const DEFAULT_INPUT_PORT: u16 = 9001;

/// Label of the negotiated media-transport data channel that carries input.
pub const DATA_CHANNEL_LABEL: &str = "input";

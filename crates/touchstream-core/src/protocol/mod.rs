//! Protocol module containing the event types and the binary codec.

pub mod codec;
pub mod event;

pub use codec::{decode_event, decode_frame, encode_event, FormatError};
pub use event::{EventKind, InputEvent, EVENT_SIZE};

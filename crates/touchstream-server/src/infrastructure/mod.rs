//! Infrastructure layer: device backends, transport adapters, and the
//! media-engine signaling relay.

pub mod media_engine;
pub mod transport;
pub mod virtual_device;

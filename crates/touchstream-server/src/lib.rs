//! # touchstream-server
//!
//! Host-side server for the touchstream input back-channel.  Receives binary
//! input events from a viewer over one of three transports (UDP datagrams, a
//! WebSocket relay, or a media-engine data channel), decodes them with
//! `touchstream-core`, and injects them into the kernel through a virtual
//! multi-touch device.
//!
//! Layering follows the usual split:
//!
//! - **`domain`** – configuration types, no I/O.
//! - **`application`** – the injector state machine behind the
//!   [`application::inject_input::TouchscreenBackend`] trait seam.
//! - **`infrastructure`** – the uinput device backend, the transport
//!   adapters, and the media-engine signaling relay.

pub mod application;
pub mod domain;
pub mod infrastructure;

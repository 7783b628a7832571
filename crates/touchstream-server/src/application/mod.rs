//! Application layer: the input injector state machine.

pub mod inject_input;

pub use inject_input::{InjectError, InputInjector, TouchscreenBackend};

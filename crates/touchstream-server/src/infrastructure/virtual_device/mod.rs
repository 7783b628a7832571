//! Virtual touchscreen device backends.
//!
//! [`descriptor`] declares the capability set once at startup; [`uinput`]
//! registers it with the kernel on Linux; [`mock`] records primitives in
//! memory for tests.

pub mod descriptor;
pub mod mock;
#[cfg(target_os = "linux")]
pub mod uinput;

pub use descriptor::TouchscreenDescriptor;

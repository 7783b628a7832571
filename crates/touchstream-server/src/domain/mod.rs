//! Domain layer: configuration types.

pub mod config;

pub use config::{ServerConfig, TransportMode};

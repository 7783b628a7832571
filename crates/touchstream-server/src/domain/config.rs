//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production), from
//! a TOML file, or from defaults (useful for local development and tests).
//!
//! Keeping configuration as a plain struct — no global state, no environment
//! variable reads inside the domain — makes the server easy to embed in
//! tests.  The binary is responsible for populating it.

use std::net::SocketAddr;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;

use touchstream_core::{DEFAULT_INPUT_PORT, STREAM_HEIGHT, STREAM_WIDTH};

/// Which ingress transport the server runs for this session.
///
/// Exactly one transport is active per invocation; the injector itself is
/// transport-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Connectionless datagram ingress (default, lowest latency).
    Udp,
    /// WebSocket relay ingress: binary frames from a persisted session.
    Ws,
    /// Media-engine mode: signaling relay plus decoded data-channel payloads.
    Webrtc,
}

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("stream geometry must be positive, got {width}x{height}")]
    Geometry { width: i32, height: i32 },
}

/// All runtime configuration for the input server.
///
/// Build this once at startup and share it read-only.
///
/// # Example
///
/// ```rust
/// use touchstream_server::domain::ServerConfig;
///
/// // Defaults are suitable for local development:
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.udp_bind_addr.port(), 9001);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// The active ingress transport for this session.
    pub transport: TransportMode,

    /// Bind address for the datagram ingress.
    ///
    /// `0.0.0.0` accepts events from any interface; the channel is
    /// unauthenticated by design (fire-and-forget back-channel).
    pub udp_bind_addr: SocketAddr,

    /// Bind address for the WebSocket relay ingress.
    pub ws_bind_addr: SocketAddr,

    /// Bind address for the viewer-facing signaling endpoint (webrtc mode).
    pub signaling_bind_addr: SocketAddr,

    /// WebSocket address of the external media engine (webrtc mode).
    ///
    /// The engine owns offer/answer and ICE; this server only relays its
    /// text frames and consumes its decoded data-channel payloads.
    pub engine_addr: SocketAddr,

    /// Streamed surface width in device pixels; X coordinates are clamped to
    /// `[0, stream_width - 1]` at injection.
    pub stream_width: i32,

    /// Streamed surface height in device pixels.
    pub stream_height: i32,

    /// Name the virtual touchscreen registers with the kernel.
    pub device_name: String,
}

impl Default for ServerConfig {
    /// Returns a configuration suitable for local development.
    ///
    /// | Field               | Default          |
    /// |---------------------|------------------|
    /// | transport           | `udp`            |
    /// | udp_bind_addr       | `0.0.0.0:9001`   |
    /// | ws_bind_addr        | `0.0.0.0:8081`   |
    /// | signaling_bind_addr | `0.0.0.0:8080`   |
    /// | engine_addr         | `127.0.0.1:8555` |
    /// | stream geometry     | 1280×720         |
    /// | device_name         | `touchstream-touch` |
    fn default() -> Self {
        Self {
            transport: TransportMode::Udp,
            // Literal addresses are compile-time-known valid, so the parses
            // cannot fail.
            udp_bind_addr: format!("0.0.0.0:{DEFAULT_INPUT_PORT}").parse().unwrap(),
            ws_bind_addr: "0.0.0.0:8081".parse().unwrap(),
            signaling_bind_addr: "0.0.0.0:8080".parse().unwrap(),
            engine_addr: "127.0.0.1:8555".parse().unwrap(),
            stream_width: STREAM_WIDTH,
            stream_height: STREAM_HEIGHT,
            device_name: "touchstream-touch".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parses a configuration from TOML text.  Absent fields take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown fields,
    /// and [`ConfigError::Geometry`] on a degenerate stream surface.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants deserialization cannot express.
    ///
    /// Call this again after applying CLI overrides — a value that was valid
    /// in the file can be overridden into an invalid one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Geometry`] when either stream dimension is
    /// smaller than one pixel: the injector clamps coordinates to
    /// `[0, dimension - 1]`, which is only well-formed on a non-empty
    /// surface.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream_width < 1 || self.stream_height < 1 {
            return Err(ConfigError::Geometry {
                width: self.stream_width,
                height: self.stream_height,
            });
        }
        Ok(())
    }

    /// Loads a configuration from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its contents are malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

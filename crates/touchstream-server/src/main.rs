//! Touchstream input server — entry point.
//!
//! This binary receives input events from a remote viewer and replays them on
//! a virtual multi-touch device, so a stream viewer's taps and key presses
//! land on the streaming host as if a finger touched a real screen.
//!
//! # Why a back-channel process?
//!
//! The video pipeline only flows one way: host → viewer.  Interaction needs
//! the reverse direction, and it must be cheap — input events are tiny and
//! latency-sensitive, so they travel as compact binary records rather than
//! riding the media transport's control plane.  This server is that reverse
//! path: decode records, drive the kernel's uinput touchscreen.
//!
//! # Usage
//!
//! ```text
//! touchstream-server [OPTIONS]
//!
//! Options:
//!   --config    <PATH>   Optional TOML configuration file
//!   --transport <MODE>   Ingress transport: udp | ws | webrtc [default: udp]
//!   --udp-port  <PORT>   Datagram ingress port [default: 9001]
//!   --ws-port   <PORT>   WebSocket relay port [default: 8081]
//!   --signaling-port <PORT>  Viewer signaling port, webrtc mode [default: 8080]
//!   --engine-addr <ADDR> Media engine WebSocket address [default: 127.0.0.1:8555]
//!   --width     <PX>     Streamed surface width [default: 1280]
//!   --height    <PX>     Streamed surface height [default: 720]
//! ```
//!
//! CLI arguments override the config file, which overrides the built-in
//! defaults.  Environment variables (`TOUCHSTREAM_*`) sit between the file
//! and the CLI.
//!
//! # Architecture overview
//!
//! ```text
//! Viewer  (13-byte binary records)
//!       ↓  UDP / WebSocket relay / data channel
//! touchstream-server  ← this process
//!   domain/          ServerConfig, transport mode
//!   application/     InputInjector slot state machine
//!   infrastructure/
//!     transport/     ingress adapters + shared ingest path
//!     virtual_device/ uinput touchscreen
//!     media_engine/  signaling relay (webrtc mode)
//!       ↓
//! /dev/uinput  (kernel virtual touchscreen)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use touchstream_server::application::{InputInjector, TouchscreenBackend};
use touchstream_server::domain::{ServerConfig, TransportMode};
use touchstream_server::infrastructure::media_engine::run_webrtc_mode;
use touchstream_server::infrastructure::transport::udp::UdpTransport;
use touchstream_server::infrastructure::transport::websocket::WsTransport;
use touchstream_server::infrastructure::transport::EventIngest;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Touchstream input back-channel server.
///
/// Receives viewer input events over one of three transports and replays
/// them on a virtual multi-touch device.
#[derive(Debug, Parser)]
#[command(
    name = "touchstream-server",
    about = "Input back-channel for remote stream viewers",
    version
)]
struct Cli {
    /// Path to an optional TOML configuration file.
    ///
    /// CLI arguments override values from the file.
    #[arg(long, env = "TOUCHSTREAM_CONFIG")]
    config: Option<PathBuf>,

    /// Ingress transport for this session.
    #[arg(long, value_enum, env = "TOUCHSTREAM_TRANSPORT")]
    transport: Option<TransportMode>,

    /// UDP port for the datagram ingress.
    #[arg(long, env = "TOUCHSTREAM_UDP_PORT")]
    udp_port: Option<u16>,

    /// TCP port for the WebSocket relay ingress.
    #[arg(long, env = "TOUCHSTREAM_WS_PORT")]
    ws_port: Option<u16>,

    /// TCP port for the viewer-facing signaling endpoint (webrtc mode).
    #[arg(long, env = "TOUCHSTREAM_SIGNALING_PORT")]
    signaling_port: Option<u16>,

    /// IP address to bind the ingress listeners to.
    ///
    /// `0.0.0.0` accepts events from any interface; `127.0.0.1` restricts
    /// the back-channel to local senders.
    #[arg(long, env = "TOUCHSTREAM_BIND")]
    bind: Option<String>,

    /// WebSocket address of the external media engine (webrtc mode).
    #[arg(long, env = "TOUCHSTREAM_ENGINE_ADDR")]
    engine_addr: Option<SocketAddr>,

    /// Streamed surface width in device pixels.
    #[arg(long, env = "TOUCHSTREAM_WIDTH")]
    width: Option<i32>,

    /// Streamed surface height in device pixels.
    #[arg(long, env = "TOUCHSTREAM_HEIGHT")]
    height: Option<i32>,

    /// Name the virtual touchscreen registers with the kernel.
    #[arg(long, env = "TOUCHSTREAM_DEVICE_NAME")]
    device_name: Option<String>,
}

impl Cli {
    /// Resolves the effective configuration: built-in defaults, then the
    /// config file (if given), then CLI / environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, if
    /// `--bind` is not a valid IP address, or if the resolved stream
    /// geometry is not positive.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(port) = self.udp_port {
            config.udp_bind_addr.set_port(port);
        }
        if let Some(port) = self.ws_port {
            config.ws_bind_addr.set_port(port);
        }
        if let Some(port) = self.signaling_port {
            config.signaling_bind_addr.set_port(port);
        }
        if let Some(bind) = &self.bind {
            let ip: std::net::IpAddr = bind
                .parse()
                .with_context(|| format!("invalid bind address: '{bind}'"))?;
            config.udp_bind_addr.set_ip(ip);
            config.ws_bind_addr.set_ip(ip);
            config.signaling_bind_addr.set_ip(ip);
        }
        if let Some(addr) = self.engine_addr {
            config.engine_addr = addr;
        }
        if let Some(width) = self.width {
            config.stream_width = width;
        }
        if let Some(height) = self.height {
            config.stream_height = height;
        }
        if let Some(name) = self.device_name {
            config.device_name = name;
        }

        // Overrides can invalidate a previously valid file, so the final
        // shape is what gets validated.
        config.validate()?;

        Ok(config)
    }
}

// ── Device creation ───────────────────────────────────────────────────────────

/// Creates the uinput-backed virtual touchscreen.
///
/// Device creation failure is the one fatal error in this server: without
/// the device there is nothing to inject into, so startup aborts with
/// context rather than limping along.
#[cfg(target_os = "linux")]
fn create_backend(config: &ServerConfig) -> anyhow::Result<Box<dyn TouchscreenBackend>> {
    use touchstream_server::infrastructure::virtual_device::uinput::UinputTouchscreen;
    use touchstream_server::infrastructure::virtual_device::TouchscreenDescriptor;

    let descriptor = TouchscreenDescriptor::new(
        &config.device_name,
        config.stream_width,
        config.stream_height,
    );
    let device = UinputTouchscreen::create(&descriptor)
        .context("failed to create virtual touchscreen (is /dev/uinput accessible?)")?;
    Ok(Box::new(device))
}

#[cfg(not(target_os = "linux"))]
fn create_backend(_config: &ServerConfig) -> anyhow::Result<Box<dyn TouchscreenBackend>> {
    anyhow::bail!("the virtual touchscreen requires Linux uinput support")
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log level comes from RUST_LOG; default to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_server_config()?;

    info!(
        "touchstream input server starting — transport={:?}, surface={}x{}",
        config.transport, config.stream_width, config.stream_height
    );

    let backend = create_backend(&config)?;
    let injector = InputInjector::new(backend, config.stream_width, config.stream_height);
    let ingest = Arc::new(EventIngest::new(injector));

    // Graceful shutdown: Ctrl+C clears the flag, the accept/receive loops
    // observe it within 200 ms and run the cancellation flush on exit.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    match config.transport {
        TransportMode::Udp => {
            let transport = UdpTransport::bind(config.udp_bind_addr).await?;
            transport.run(ingest, running).await;
        }
        TransportMode::Ws => {
            let transport = WsTransport::bind(config.ws_bind_addr).await?;
            transport.run(ingest, running).await;
        }
        TransportMode::Webrtc => {
            run_webrtc_mode(&config, ingest, running).await?;
        }
    }

    info!("touchstream input server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

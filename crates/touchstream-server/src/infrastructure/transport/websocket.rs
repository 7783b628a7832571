//! WebSocket relay transport adapter.
//!
//! Browsers cannot send UDP, so a relay path exists: the viewer keeps one
//! WebSocket session open and sends binary frames, each carrying one or more
//! whole event records.  Frames shorter than one record are non-input
//! control frames and are ignored, not treated as errors; text frames and
//! protocol-level ping/pong are likewise ignored.
//!
//! The accept loop uses a short timeout so the shared `running` flag is
//! observed within 200 ms.  Each session runs in its own Tokio task; when a
//! session ends — clean close or error — the cancellation flush runs so a
//! disconnect mid-gesture never leaves a finger down.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};

use touchstream_core::EVENT_SIZE;

use crate::infrastructure::transport::{EventIngest, TransportError};

/// The bound relay ingress listener.
pub struct WsTransport {
    listener: TcpListener,
}

impl WsTransport {
    /// Binds the relay listener on `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::BindFailed`] when the port cannot be bound.
    pub async fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::BindFailed { addr, source })?;
        info!("relay ingress listening on {addr}");
        Ok(Self { listener })
    }

    /// The locally bound address (useful when binding port 0 in tests).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until `running` is cleared.
    ///
    /// Sessions share the single ingest path; the injector's mutex
    /// serializes them if a viewer reconnects before its old session ends.
    pub async fn run(self, ingest: Arc<EventIngest>, running: Arc<AtomicBool>) {
        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping relay accept loop");
                break;
            }

            match timeout(Duration::from_millis(200), self.listener.accept()).await {
                Ok(Ok((stream, peer_addr))) => {
                    info!("relay session from {peer_addr}");
                    let ingest = Arc::clone(&ingest);
                    tokio::spawn(async move {
                        handle_relay_session(stream, peer_addr, ingest).await;
                    });
                }
                Ok(Err(e)) => {
                    error!("relay accept error: {e}");
                }
                Err(_) => {
                    // Timeout; loop back to check the running flag.
                }
            }
        }

        ingest.flush().await;
    }
}

/// Outer wrapper so [`run_relay_session`] can use `?` while errors are
/// logged here and the flush always runs.
async fn handle_relay_session(stream: TcpStream, peer_addr: SocketAddr, ingest: Arc<EventIngest>) {
    match run_relay_session(stream, peer_addr, &ingest).await {
        Ok(()) => info!("relay session {peer_addr} closed normally"),
        Err(e) => warn!("relay session {peer_addr} closed with error: {e:#}"),
    }
    // Transport cancellation: force all fingers up before the next session.
    ingest.flush().await;
}

async fn run_relay_session(
    stream: TcpStream,
    peer_addr: SocketAddr,
    ingest: &EventIngest,
) -> anyhow::Result<()> {
    let mut ws_stream = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    while let Some(frame) = ws_stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            // Running past the close handshake is a normal end; a protocol
            // violation is not, and must be reported as the session outcome.
            Err(WsError::ConnectionClosed) => break,
            Err(e) => return Err(e).context("relay session receive error"),
        };

        match frame {
            WsMessage::Binary(payload) if payload.len() >= EVENT_SIZE => {
                ingest.ingest_frame(&payload).await;
            }
            WsMessage::Binary(payload) => {
                // Shorter than one record: a control frame, not an error.
                debug!(
                    "relay session {peer_addr}: ignoring {}-byte control frame",
                    payload.len()
                );
            }
            WsMessage::Text(_) => {
                debug!("relay session {peer_addr}: ignoring text frame");
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
            WsMessage::Close(_) => break,
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

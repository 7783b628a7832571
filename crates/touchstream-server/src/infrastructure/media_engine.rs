//! Media-engine mode: signaling relay plus data-channel ingest.
//!
//! The media transport session (offer/answer, ICE, the data channel itself)
//! is owned by an external engine process.  This module glues the viewer to
//! it without interpreting either side:
//!
//! 1. A viewer connects to the signaling endpoint (WebSocket).
//! 2. The server opens a WebSocket to the engine for that session.
//! 3. Two pump tasks relay **text frames opaquely** in both directions —
//!    signaling payloads are never parsed beyond a JSON well-formedness
//!    check.
//! 4. **Binary frames from the engine** are decoded data-channel payloads
//!    (the negotiated `"input"` channel) and are handed to the
//!    [`DataChannelAdapter`](crate::infrastructure::transport::data_channel).
//! 5. When either side disconnects the session ends, the cancellation flush
//!    runs, and the endpoint re-arms for the next viewer.
//!
//! One viewer session runs at a time; the session is handled inline in the
//! accept loop rather than spawned, which enforces the single-viewer policy
//! without any extra bookkeeping.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async, connect_async,
    tungstenite::Message as WsMessage,
};
use tracing::{debug, error, info, warn};

use touchstream_core::DATA_CHANNEL_LABEL;

use crate::domain::ServerConfig;
use crate::infrastructure::transport::data_channel::payload_channel;
use crate::infrastructure::transport::EventIngest;

/// Runs the signaling endpoint until `running` is cleared.
///
/// # Errors
///
/// Returns an error only if the signaling listener cannot be bound; session
/// failures are logged and the endpoint re-arms.
pub async fn run_webrtc_mode(
    config: &ServerConfig,
    ingest: Arc<EventIngest>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.signaling_bind_addr)
        .await
        .with_context(|| {
            format!(
                "failed to bind signaling listener on {}",
                config.signaling_bind_addr
            )
        })?;

    info!(
        "signaling endpoint listening on {} (engine at {})",
        config.signaling_bind_addr, config.engine_addr
    );

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping signaling accept loop");
            break;
        }

        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                info!("viewer session from {peer_addr}");
                // Inline, not spawned: one viewer at a time.
                handle_viewer_session(stream, peer_addr, config.engine_addr, &ingest).await;
            }
            Ok(Err(e)) => {
                error!("signaling accept error: {e}");
            }
            Err(_) => {
                // Timeout; loop back to check the running flag.
            }
        }
    }

    ingest.flush().await;
    Ok(())
}

/// Outer wrapper: logs the session outcome and guarantees the flush.
async fn handle_viewer_session(
    stream: TcpStream,
    peer_addr: SocketAddr,
    engine_addr: SocketAddr,
    ingest: &Arc<EventIngest>,
) {
    match run_viewer_session(stream, peer_addr, engine_addr, ingest).await {
        Ok(()) => info!("viewer session {peer_addr} closed normally"),
        Err(e) => warn!("viewer session {peer_addr} closed with error: {e:#}"),
    }
    ingest.flush().await;
}

/// Runs one complete viewer session: handshake both legs, pump until either
/// side disconnects.
async fn run_viewer_session(
    stream: TcpStream,
    peer_addr: SocketAddr,
    engine_addr: SocketAddr,
    ingest: &Arc<EventIngest>,
) -> anyhow::Result<()> {
    let viewer_ws = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with viewer {peer_addr}"))?;

    let (engine_ws, _) = connect_async(format!("ws://{engine_addr}"))
        .await
        .with_context(|| format!("failed to connect to media engine at {engine_addr}"))?;

    debug!(
        "viewer {peer_addr}: engine leg established; \
         binary frames carry decoded {DATA_CHANNEL_LABEL:?}-channel payloads"
    );

    let (mut viewer_tx, mut viewer_rx) = viewer_ws.split();
    let (mut engine_tx, mut engine_rx) = engine_ws.split();

    let (payload_tx, adapter) = payload_channel();
    let ingest_task = tokio::spawn(adapter.run(Arc::clone(ingest)));

    // Viewer → engine: opaque signaling only.
    let mut viewer_to_engine = tokio::spawn(async move {
        while let Some(frame) = viewer_rx.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => {
                    // Relayed opaquely, but garbage is cut off here rather
                    // than at the engine.
                    if serde_json::from_str::<serde_json::Value>(&text).is_err() {
                        warn!("viewer sent non-JSON signaling frame; dropping");
                        continue;
                    }
                    if engine_tx.send(WsMessage::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(WsMessage::Binary(_)) => {
                    // Input arrives via the data channel, never the
                    // signaling socket.
                    debug!("viewer sent unexpected binary signaling frame; ignoring");
                }
                Ok(WsMessage::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });

    // Engine → viewer (text) and engine → injector (binary payloads).
    let mut engine_to_viewer = tokio::spawn(async move {
        while let Some(frame) = engine_rx.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => {
                    if viewer_tx.send(WsMessage::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(WsMessage::Binary(payload)) => {
                    // Decoded "input" data-channel payload.
                    if payload_tx.send(payload).await.is_err() {
                        break;
                    }
                }
                Ok(WsMessage::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });

    // Either pump ending means the session is over.
    tokio::select! {
        _ = &mut viewer_to_engine => debug!("viewer {peer_addr}: viewer→engine pump ended"),
        _ = &mut engine_to_viewer => debug!("viewer {peer_addr}: engine→viewer pump ended"),
    }
    viewer_to_engine.abort();
    engine_to_viewer.abort();

    // Aborting the engine pump drops the payload sender, which ends the
    // adapter and runs its flush; wait so the flush precedes the next session.
    let _ = ingest_task.await;

    Ok(())
}

//! Transport adapters and the shared ingest path.
//!
//! Three ingress channels exist — UDP datagrams, a WebSocket relay, and the
//! media-engine data channel — but they differ only in byte-source plumbing.
//! Every adapter hands its raw buffers to the same [`EventIngest`], which is
//! the single decode-and-apply path: the injector is unreachable except
//! through it, so its invariants hold regardless of transport.

pub mod data_channel;
pub mod udp;
pub mod websocket;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use touchstream_core::{decode_frame, EVENT_SIZE};

use crate::application::inject_input::InputInjector;

/// Error type for transport setup and session failures.
///
/// A transport error terminates that adapter's session (after the
/// cancellation flush) but never the process; only bind failures at startup
/// are fatal.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The listener socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// The single decode-and-apply path shared by all transport adapters.
///
/// Wraps the injector in an async mutex — the device handle is not safe for
/// concurrent writers, and press/release-edge correctness needs a globally
/// consistent active-slot count.  Per-event failures are recovered here;
/// diagnostics are rate-limited counters, not per-datagram log lines.
pub struct EventIngest {
    injector: Mutex<InputInjector>,
    decoded: AtomicU64,
    applied: AtomicU64,
    write_errors: AtomicU64,
    short_frames: AtomicU64,
}

/// Cadence of the "events injected" progress log line.
const LOG_EVERY: u64 = 500;

impl EventIngest {
    /// Wraps `injector` as the sole consumer of decoded events.
    pub fn new(injector: InputInjector) -> Self {
        Self {
            injector: Mutex::new(injector),
            decoded: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            short_frames: AtomicU64::new(0),
        }
    }

    /// Decodes every whole record in `frame` and applies them in order.
    ///
    /// A frame shorter than one record is counted and skipped — on the
    /// datagram path that is a malformed send, on the message paths a
    /// non-input control frame; neither is worth a log line per occurrence.
    pub async fn ingest_frame(&self, frame: &[u8]) {
        if frame.len() < EVENT_SIZE {
            self.short_frames.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let events = decode_frame(frame);
        self.decoded
            .fetch_add(events.len() as u64, Ordering::Relaxed);

        let mut injector = self.injector.lock().await;
        for event in &events {
            match injector.apply(event) {
                Ok(()) => {
                    let applied = self.applied.fetch_add(1, Ordering::Relaxed) + 1;
                    if applied % LOG_EVERY == 0 {
                        info!(applied, "events injected");
                    }
                }
                Err(e) => {
                    // A single bad write must not terminate the session.
                    self.write_errors.fetch_add(1, Ordering::Relaxed);
                    warn!("event injection error: {e}");
                }
            }
        }
    }

    /// Runs the cancellation flush (synthetic all-fingers-up) and logs the
    /// session counters.  Called whenever a transport session ends.
    pub async fn flush(&self) {
        let mut injector = self.injector.lock().await;
        if let Err(e) = injector.flush() {
            warn!("session flush failed: {e}");
        }
        info!(
            decoded = self.decoded.load(Ordering::Relaxed),
            applied = self.applied.load(Ordering::Relaxed),
            write_errors = self.write_errors.load(Ordering::Relaxed),
            short_frames = self.short_frames.load(Ordering::Relaxed),
            "session ingest summary"
        );
        debug!("active slots after flush: {}", injector.active_count());
    }

    /// Total events applied so far (diagnostic).
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    /// Total short frames skipped so far (diagnostic).
    pub fn short_frames(&self) -> u64 {
        self.short_frames.load(Ordering::Relaxed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

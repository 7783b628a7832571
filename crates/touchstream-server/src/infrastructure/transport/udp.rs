//! Datagram (UDP) transport adapter.
//!
//! The lowest-latency ingress: the sender fires 13-byte records (optionally
//! batched back to back) at the input port with no reliability or ordering
//! guarantee.  Duplicate or dropped datagrams are tolerated silently —
//! slot-indexed absolute state makes every event self-describing, so a lost
//! MOVE only costs smoothness, never correctness.
//!
//! The receive loop polls under a short timeout so the shared `running` flag
//! is observed within 200 ms even when no datagrams arrive.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{error, info};

use crate::infrastructure::transport::{EventIngest, TransportError};

/// Upper bound of one datagram; matches the sender's batching limit.
const MAX_DATAGRAM_SIZE: usize = 256;

/// The bound datagram ingress socket.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Binds the ingress socket on `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::BindFailed`] when the port is taken or the
    /// process lacks permission.
    pub async fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TransportError::BindFailed { addr, source })?;
        info!("datagram ingress listening on UDP {addr}");
        Ok(Self { socket })
    }

    /// The locally bound address (useful when binding port 0 in tests).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Runs the receive loop until `running` is cleared, then flushes.
    ///
    /// Each datagram goes through the shared ingest path whole; receive
    /// errors are logged and the loop continues.
    pub async fn run(self, ingest: Arc<EventIngest>, running: Arc<AtomicBool>) {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        while running.load(Ordering::Relaxed) {
            // Short timeout so shutdown is observed promptly on a quiet socket.
            match timeout(Duration::from_millis(200), self.socket.recv_from(&mut buf)).await {
                Ok(Ok((len, _src))) => {
                    ingest.ingest_frame(&buf[..len]).await;
                }
                Ok(Err(e)) => {
                    error!("datagram receive error: {e}");
                }
                Err(_) => {
                    // Timeout; loop back to check the running flag.
                }
            }
        }

        // A datagram session has no explicit end, so shutdown is the
        // cancellation point: never leave a finger logically down.
        ingest.flush().await;
        info!("datagram ingress stopped");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_on_ephemeral_port_succeeds() {
        // Arrange / Act
        let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
            .await
            .expect("bind must succeed");

        // Assert
        assert_ne!(transport.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_returns_bind_failed() {
        // Arrange — occupy a port
        let first = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = first.local_addr().unwrap();

        // Act
        let second = UdpTransport::bind(addr).await;

        // Assert
        assert!(matches!(second, Err(TransportError::BindFailed { .. })));
    }
}

//! Integration tests for the transport adapters and the shared ingest path.
//!
//! # Purpose
//!
//! These tests run real sockets end to end: a transport is bound on an
//! ephemeral port (`127.0.0.1:0`), a client sends encoded event records the
//! way a viewer would, and the assertions inspect the primitive log of a
//! mock touchscreen backend.  They verify:
//!
//! - The happy path: datagrams and WebSocket binary frames reach the
//!   injector and produce the documented primitive sequences.
//! - Batching: one buffer carrying several records applies them in order.
//! - The cancellation flush: a session that disconnects mid-gesture never
//!   leaves a finger logically down.
//!
//! # Event flow under test
//!
//! ```text
//! test client                      touchstream-server
//! ───────────                      ──────────────────
//! encode_event(...)         →      UdpTransport / WsTransport
//!   13-byte records                  EventIngest::ingest_frame
//!                                      InputInjector::apply
//!                                        MockTouchscreen (primitive log)
//! ```
//!
//! # Timing
//!
//! The transports poll a shutdown flag every 200 ms and the ingest counters
//! are updated asynchronously, so assertions poll with a generous deadline
//! instead of sleeping a fixed amount.  On an unloaded machine each test
//! settles in well under a second.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::SinkExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use touchstream_core::{encode_event, InputEvent, STREAM_HEIGHT, STREAM_WIDTH};
use touchstream_server::application::InputInjector;
use touchstream_server::infrastructure::transport::udp::UdpTransport;
use touchstream_server::infrastructure::transport::websocket::WsTransport;
use touchstream_server::infrastructure::transport::EventIngest;
use touchstream_server::infrastructure::virtual_device::mock::{MockTouchscreen, Primitive};

// ── Helpers ───────────────────────────────────────────────────────────────────

type PrimitiveLog = Arc<std::sync::Mutex<Vec<Primitive>>>;

/// Builds the ingest path backed by a mock touchscreen and returns the
/// shared primitive log alongside it.
fn make_ingest() -> (Arc<EventIngest>, PrimitiveLog) {
    let mock = MockTouchscreen::new();
    let log = mock.log();
    let injector = InputInjector::new(Box::new(mock), STREAM_WIDTH, STREAM_HEIGHT);
    (Arc::new(EventIngest::new(injector)), log)
}

/// Polls until `predicate` holds or the deadline expires.
///
/// Panics with `context` on expiry so the failing condition is named in the
/// test output.
async fn wait_until(predicate: impl Fn() -> bool, context: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !predicate() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for: {context}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ── Datagram ingress ──────────────────────────────────────────────────────────

/// Tests the full datagram path: one datagram carrying a complete tap
/// (DOWN + UP batched back to back) reaches the injector and produces a
/// press edge followed by a release edge.
#[tokio::test]
async fn test_udp_datagram_tap_reaches_the_device() {
    // Arrange — server on an ephemeral port
    let (ingest, log) = make_ingest();
    let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind");
    let addr = transport.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let server = tokio::spawn(transport.run(Arc::clone(&ingest), Arc::clone(&running)));

    // Act — a viewer-style client fires one batched datagram
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let mut frame = Vec::new();
    frame.extend_from_slice(&encode_event(&InputEvent::touch_down(100, 200, 0)));
    frame.extend_from_slice(&encode_event(&InputEvent::touch_up(100, 200, 0)));
    client.send_to(&frame, addr).await.unwrap();

    wait_until(|| ingest.applied() == 2, "both tap records applied").await;

    // Shut the receive loop down cleanly.
    running.store(false, Ordering::Relaxed);
    server.await.unwrap();

    // Assert — press then release, each sequence barrier-terminated
    let primitives = log.lock().unwrap();
    let press = primitives
        .iter()
        .position(|p| *p == Primitive::TouchButton(true))
        .expect("press edge must be emitted");
    let release = primitives
        .iter()
        .position(|p| *p == Primitive::TouchButton(false))
        .expect("release edge must be emitted");
    assert!(press < release, "press must precede release");
    assert_eq!(primitives.last(), Some(&Primitive::Sync));
}

/// Tests that shutdown flushes a finger the client left down: the datagram
/// path has no session close, so the running flag is its cancellation point.
#[tokio::test]
async fn test_udp_shutdown_flushes_held_finger() {
    // Arrange
    let (ingest, log) = make_ingest();
    let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind");
    let addr = transport.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let server = tokio::spawn(transport.run(Arc::clone(&ingest), Arc::clone(&running)));

    // Act — touch down, then "vanish" (no UP, just shutdown)
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client
        .send_to(&encode_event(&InputEvent::touch_down(50, 50, 3)), addr)
        .await
        .unwrap();
    wait_until(|| ingest.applied() == 1, "touch-down applied").await;

    running.store(false, Ordering::Relaxed);
    server.await.unwrap();

    // Assert — the flush released the held slot and the touch contact
    let primitives = log.lock().unwrap();
    assert!(primitives.contains(&Primitive::TouchButton(false)));
    assert_eq!(primitives.last(), Some(&Primitive::Sync));
}

/// Tests that garbage datagrams shorter than one record are skipped without
/// disturbing the injector.
#[tokio::test]
async fn test_udp_short_datagram_is_skipped() {
    let (ingest, log) = make_ingest();
    let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind");
    let addr = transport.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let server = tokio::spawn(transport.run(Arc::clone(&ingest), Arc::clone(&running)));

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(&[1, 2, 3], addr).await.unwrap();

    wait_until(|| ingest.short_frames() == 1, "short frame counted").await;
    running.store(false, Ordering::Relaxed);
    server.await.unwrap();

    assert_eq!(ingest.applied(), 0);
    // Only the shutdown flush ran, and with no active slots it emits nothing.
    assert!(log.lock().unwrap().is_empty());
}

// ── WebSocket relay ingress ───────────────────────────────────────────────────

/// Tests the relay path end to end: a WebSocket client sends binary frames
/// and the primitive sequence matches the datagram path exactly — the
/// injector cannot tell transports apart.
#[tokio::test]
async fn test_ws_relay_tap_reaches_the_device() {
    // Arrange
    let (ingest, log) = make_ingest();
    let transport = WsTransport::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind");
    let addr = transport.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let server = tokio::spawn(transport.run(Arc::clone(&ingest), Arc::clone(&running)));

    // Act — one frame per record, the way a browser sender batches
    let (mut ws, _) = connect_async(format!("ws://{addr}")).await.expect("connect");
    ws.send(WsMessage::Binary(
        encode_event(&InputEvent::touch_down(640, 360, 0)).to_vec(),
    ))
    .await
    .unwrap();
    ws.send(WsMessage::Binary(
        encode_event(&InputEvent::touch_up(640, 360, 0)).to_vec(),
    ))
    .await
    .unwrap();

    wait_until(|| ingest.applied() == 2, "both tap records applied").await;
    ws.close(None).await.unwrap();

    running.store(false, Ordering::Relaxed);
    server.await.unwrap();

    // Assert
    let primitives = log.lock().unwrap();
    assert!(primitives.contains(&Primitive::TouchButton(true)));
    assert!(primitives.contains(&Primitive::TouchPosition(640, 360)));
    assert!(primitives.contains(&Primitive::TouchButton(false)));
}

/// Tests the disconnect-mid-gesture guarantee on the relay path: the client
/// drops with a finger down, and the per-session flush releases it without
/// waiting for server shutdown.
#[tokio::test]
async fn test_ws_disconnect_mid_gesture_releases_the_finger() {
    // Arrange
    let (ingest, log) = make_ingest();
    let transport = WsTransport::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind");
    let addr = transport.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let server = tokio::spawn(transport.run(Arc::clone(&ingest), Arc::clone(&running)));

    // Act — DOWN, then the session ends with the finger still down
    let (mut ws, _) = connect_async(format!("ws://{addr}")).await.expect("connect");
    ws.send(WsMessage::Binary(
        encode_event(&InputEvent::touch_down(10, 20, 0)).to_vec(),
    ))
    .await
    .unwrap();
    wait_until(|| ingest.applied() == 1, "touch-down applied").await;
    drop(ws);

    // Assert — the release comes from the session flush, not shutdown
    wait_until(
        || log.lock().unwrap().contains(&Primitive::TouchButton(false)),
        "session flush releases the held finger",
    )
    .await;

    running.store(false, Ordering::Relaxed);
    server.await.unwrap();
}

/// Tests that a WebSocket protocol violation mid-gesture ends the session
/// through the error path and still runs the flush.
///
/// The client here speaks raw TCP: a hand-rolled upgrade handshake, one
/// well-formed masked binary frame carrying a DOWN, then an *unmasked*
/// frame — which RFC 6455 forbids from clients and the server must treat as
/// a protocol error, not a clean close.
#[tokio::test]
async fn test_ws_protocol_violation_ends_session_with_flush() {
    // Arrange
    let (ingest, log) = make_ingest();
    let transport = WsTransport::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind");
    let addr = transport.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let server = tokio::spawn(transport.run(Arc::clone(&ingest), Arc::clone(&running)));

    // Act — upgrade by hand
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET / HTTP/1.1\r\n\
         Host: {addr}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
         Sec-WebSocket-Version: 13\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    let mut buf = [0u8; 1024];
    while !response.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.unwrap();
        assert_ne!(n, 0, "server closed during handshake");
        response.extend_from_slice(&buf[..n]);
    }
    assert!(response.starts_with(b"HTTP/1.1 101"));

    // A valid masked binary frame (an all-zero mask key leaves the payload
    // bytes unchanged) carrying a DOWN.
    let payload = encode_event(&InputEvent::touch_down(10, 20, 0));
    let mut masked = vec![0x82, 0x80 | payload.len() as u8, 0, 0, 0, 0];
    masked.extend_from_slice(&payload);
    stream.write_all(&masked).await.unwrap();
    wait_until(|| ingest.applied() == 1, "touch-down applied").await;

    // The violation: a client frame with the mask bit clear.
    let mut unmasked = vec![0x82, payload.len() as u8];
    unmasked.extend_from_slice(&payload);
    stream.write_all(&unmasked).await.unwrap();

    // Assert — the session died on the error path, and the flush still
    // released the held finger.
    wait_until(
        || log.lock().unwrap().contains(&Primitive::TouchButton(false)),
        "protocol violation triggers the session flush",
    )
    .await;

    running.store(false, Ordering::Relaxed);
    server.await.unwrap();
}

/// Tests that short binary frames and text frames on the relay are treated
/// as non-input control traffic, not errors: the session stays open and
/// later input still applies.
#[tokio::test]
async fn test_ws_control_frames_do_not_break_the_session() {
    // Arrange
    let (ingest, _log) = make_ingest();
    let transport = WsTransport::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind");
    let addr = transport.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let server = tokio::spawn(transport.run(Arc::clone(&ingest), Arc::clone(&running)));

    // Act — control noise first, then a real record
    let (mut ws, _) = connect_async(format!("ws://{addr}")).await.expect("connect");
    ws.send(WsMessage::Binary(vec![0xFF; 4])).await.unwrap();
    ws.send(WsMessage::Text("{\"kind\":\"hello\"}".into()))
        .await
        .unwrap();
    ws.send(WsMessage::Binary(
        encode_event(&InputEvent::touch_move(7, 8, 0)).to_vec(),
    ))
    .await
    .unwrap();

    // Assert — the noise was skipped, the record applied
    wait_until(|| ingest.applied() == 1, "record after control noise applied").await;
    assert_eq!(ingest.short_frames(), 1);

    ws.close(None).await.unwrap();
    running.store(false, Ordering::Relaxed);
    server.await.unwrap();
}

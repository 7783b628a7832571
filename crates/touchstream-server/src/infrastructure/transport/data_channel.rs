//! Data-channel transport adapter.
//!
//! In media-engine mode the viewer's input travels over a negotiated data
//! channel labeled `"input"`.  The engine owns the channel; this adapter
//! only sees the decoded payloads, delivered as opaque byte buffers through
//! an mpsc channel by the engine session (see
//! [`crate::infrastructure::media_engine`]).  Decoding is identical to the
//! other adapters — the buffer is a sequence of whole records.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::infrastructure::transport::EventIngest;

/// Capacity of the payload hand-off channel; input records are tiny, so a
/// short queue bounds memory while absorbing bursts.
const PAYLOAD_QUEUE_DEPTH: usize = 64;

/// Receiving end of the data-channel payload stream.
pub struct DataChannelAdapter {
    payloads: mpsc::Receiver<Vec<u8>>,
}

/// Creates the payload hand-off pair: the sender side is driven by the
/// media-engine session, the adapter consumes it.
pub fn payload_channel() -> (mpsc::Sender<Vec<u8>>, DataChannelAdapter) {
    let (tx, rx) = mpsc::channel(PAYLOAD_QUEUE_DEPTH);
    (tx, DataChannelAdapter { payloads: rx })
}

impl DataChannelAdapter {
    /// Ingests payloads until every sender is dropped (channel closed =
    /// session over), then runs the cancellation flush.
    pub async fn run(mut self, ingest: Arc<EventIngest>) {
        while let Some(payload) = self.payloads.recv().await {
            ingest.ingest_frame(&payload).await;
        }
        ingest.flush().await;
        info!("data-channel adapter stopped");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

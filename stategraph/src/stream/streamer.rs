//! Mode-gated emitter for one run: an event channel plus a data channel.
//!
//! Both channels hold at most one pending item. A subscriber that stops draining
//! stalls the emitting run; a subscriber that dropped its receiver turns
//! emission into a no-op.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use super::{Event, MessageChunk, StreamEvent, StreamMetadata, StreamMode};

const INTERNAL_CAPACITY: usize = 1;

/// Receiving side of a [`Streamer`].
pub struct StreamReceivers<S> {
    pub events: mpsc::Receiver<Event>,
    pub stream: mpsc::Receiver<StreamEvent<S>>,
}

/// Publishes events and stream data for the modes it was created with.
#[derive(Clone)]
pub struct Streamer<S> {
    modes: Arc<HashSet<StreamMode>>,
    event_tx: mpsc::Sender<Event>,
    stream_tx: mpsc::Sender<StreamEvent<S>>,
}

impl<S> Streamer<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates a streamer for the given modes and the receivers that drain it.
    pub fn new(modes: impl IntoIterator<Item = StreamMode>) -> (Self, StreamReceivers<S>) {
        let (event_tx, events) = mpsc::channel(INTERNAL_CAPACITY);
        let (stream_tx, stream) = mpsc::channel(INTERNAL_CAPACITY);
        let streamer = Self {
            modes: Arc::new(modes.into_iter().collect()),
            event_tx,
            stream_tx,
        };
        (streamer, StreamReceivers { events, stream })
    }

    pub fn has_mode(&self, mode: StreamMode) -> bool {
        self.modes.contains(&mode)
    }

    pub fn modes(&self) -> &HashSet<StreamMode> {
        &self.modes
    }

    /// Emits a lifecycle event (mode `Debug`).
    pub async fn emit_event(&self, event: Event) {
        if self.has_mode(StreamMode::Debug) {
            let _ = self.event_tx.send(event).await;
        }
    }

    /// Emits a full state snapshot (mode `Values`).
    pub async fn emit_value(&self, state: S) {
        self.emit(StreamMode::Values, || StreamEvent::Values(state)).await;
    }

    /// Emits the state produced by a node (mode `Updates`).
    pub async fn emit_update(&self, node_id: &str, state: S) {
        self.emit(StreamMode::Updates, || StreamEvent::Updates {
            node_id: node_id.to_string(),
            state,
        })
        .await;
    }

    /// Emits a custom payload (mode `Custom`).
    pub async fn emit_custom(&self, data: Value) {
        self.emit(StreamMode::Custom, || StreamEvent::Custom(data)).await;
    }

    /// Emits a message chunk produced by `node_id` (mode `Messages`).
    pub async fn emit_message(&self, node_id: &str, chunk: MessageChunk) {
        self.emit(StreamMode::Messages, || StreamEvent::Messages {
            chunk,
            metadata: StreamMetadata {
                langgraph_node: node_id.to_string(),
            },
        })
        .await;
    }

    async fn emit(&self, mode: StreamMode, event: impl FnOnce() -> StreamEvent<S>) {
        if self.has_mode(mode) {
            let _ = self.stream_tx.send(event()).await;
        }
    }
}

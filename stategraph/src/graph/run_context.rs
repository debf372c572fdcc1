//! Run context passed into nodes: one per run, never shared between runs.
//!
//! Holds the run id, per-run config, the run's own [`Streamer`] and
//! [`InterruptManager`], and the cancellation token that ends a pause.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::RunnableConfig;
use crate::interrupt::{InterruptInfo, InterruptManager};
use crate::stream::{Event, EventType, MessageChunk, StreamEvent, StreamMode, StreamReceivers, Streamer};

/// Receivers for everything a run publishes.
///
/// Dropping a receiver opts out of that output: emissions to it become no-ops,
/// and a pause with no interrupt receiver fails with `InterruptError::NoListener`.
pub struct RunReceivers<S> {
    pub events: mpsc::Receiver<Event>,
    pub stream: mpsc::Receiver<StreamEvent<S>>,
    pub interrupts: mpsc::Receiver<InterruptInfo>,
}

#[derive(Clone)]
pub struct RunContext<S> {
    run_id: Arc<str>,
    config: Arc<RunnableConfig>,
    streamer: Streamer<S>,
    interrupts: InterruptManager<S>,
    cancel: CancellationToken,
    node: Option<Arc<str>>,
}

impl<S> RunContext<S>
where
    S: Clone + Send + Sync + Serialize + 'static,
{
    /// Creates a fresh context and the receivers that observe it.
    ///
    /// The run id is `config.run_id` when set, otherwise `run-<uuid>`.
    pub fn new<M, B>(
        config: RunnableConfig,
        modes: M,
        breakpoints: B,
        cancel: CancellationToken,
    ) -> (Self, RunReceivers<S>)
    where
        M: IntoIterator<Item = StreamMode>,
        B: IntoIterator<Item = String>,
    {
        let run_id: Arc<str> = match &config.run_id {
            Some(id) => Arc::from(id.as_str()),
            None => Arc::from(format!("run-{}", uuid::Uuid::new_v4())),
        };
        let (streamer, StreamReceivers { events, stream }) = Streamer::new(modes);
        let (interrupts, interrupt_rx) =
            InterruptManager::with_breakpoints(run_id.to_string(), breakpoints);
        let ctx = Self {
            run_id,
            config: Arc::new(config),
            streamer,
            interrupts,
            cancel,
            node: None,
        };
        let receivers = RunReceivers {
            events,
            stream,
            interrupts: interrupt_rx,
        };
        (ctx, receivers)
    }

    /// Same run, scoped to `node` (used for message metadata).
    pub(crate) fn for_node(&self, node: &str) -> Self {
        Self {
            node: Some(Arc::from(node)),
            ..self.clone()
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &RunnableConfig {
        &self.config
    }

    pub fn streamer(&self) -> &Streamer<S> {
        &self.streamer
    }

    /// Interrupt manager of this run; clone it to resume or edit breakpoints from elsewhere.
    pub fn interrupts(&self) -> &InterruptManager<S> {
        &self.interrupts
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Node currently executing, when called from inside a node.
    pub fn current_node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    /// Event stamped with this run's id, tags and config metadata.
    pub fn event(&self, event_type: EventType, name: impl Into<String>) -> Event {
        let mut event = Event::new(event_type, name, self.run_id.as_ref());
        event.tags = self.config.tags.clone();
        event.metadata = self.config.metadata.clone();
        event
    }

    /// Publishes a custom payload (mode `Custom`).
    pub async fn emit_custom(&self, data: Value) {
        self.streamer.emit_custom(data).await;
    }

    /// Publishes a message chunk attributed to the current node (mode `Messages`).
    pub async fn emit_message(&self, content: impl Into<String>) {
        let node = self.node.as_deref().unwrap_or_default();
        self.streamer
            .emit_message(
                node,
                MessageChunk {
                    content: content.into(),
                },
            )
            .await;
    }
}

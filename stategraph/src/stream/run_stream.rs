//! Handle to a run started by `CompiledStateGraph::stream`.

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::interrupt::{InterruptError, InterruptInfo, InterruptManager};

use super::{Event, StreamEvent};

/// Outputs and controls of one background run.
///
/// `stream` carries values, updates, custom data and messages for the
/// configured modes; `events` carries lifecycle events (mode `Debug`) and,
/// when the run fails, a final `on_chain_end` event with `metadata.error`.
/// Both are buffered to `StreamConfig::buffer_size`. Dropping one is fine;
/// the run keeps going.
///
/// `interrupts` delivers pauses. Answer each with [`resume`](Self::resume),
/// or cancel the run.
pub struct RunStream<S> {
    pub stream: mpsc::Receiver<StreamEvent<S>>,
    pub events: mpsc::Receiver<Event>,
    pub interrupts: mpsc::Receiver<InterruptInfo>,
    controller: InterruptManager<S>,
    run_id: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl<S> RunStream<S>
where
    S: Serialize + Send + 'static,
{
    pub(crate) fn new(
        stream: mpsc::Receiver<StreamEvent<S>>,
        events: mpsc::Receiver<Event>,
        interrupts: mpsc::Receiver<InterruptInfo>,
        controller: InterruptManager<S>,
        run_id: String,
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    ) -> Self {
        Self {
            stream,
            events,
            interrupts,
            controller,
            run_id,
            cancel,
            handle,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Interrupt manager of the run; use it to edit breakpoints mid-run.
    pub fn controller(&self) -> &InterruptManager<S> {
        &self.controller
    }

    /// Resumes a paused run with `state`.
    pub async fn resume(&self, state: S) -> Result<(), InterruptError> {
        self.controller.resume(state).await
    }

    /// Stops forwarding and ends any pending pause with `InterruptError::Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Data channel as a `Stream`. Events and interrupts are dropped.
    pub fn into_value_stream(self) -> ReceiverStream<StreamEvent<S>> {
        ReceiverStream::new(self.stream)
    }

    /// Event channel as a `Stream`. Data and interrupts are dropped.
    pub fn into_event_stream(self) -> ReceiverStream<Event> {
        ReceiverStream::new(self.events)
    }

    /// Waits for the background task to finish.
    ///
    /// Drops the receivers first, so later emissions are discarded and a later
    /// pause fails with `NoListener`. A pause already delivered still waits for
    /// `resume` or `cancel`.
    pub async fn join(self) {
        let Self {
            stream,
            events,
            interrupts,
            handle,
            ..
        } = self;
        drop((stream, events, interrupts));
        let _ = handle.await;
    }
}

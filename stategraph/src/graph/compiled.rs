//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile`. Each run gets its own [`RunContext`]
//! (streamer, interrupt manager, run id), so one compiled graph can serve
//! any number of runs, concurrent ones included.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::RunnableConfig;
use crate::error::GraphError;
use crate::stream::{
    Event, EventType, RunStream, StreamConfig, StreamEvent, StreamReceivers, RUN_EVENT_NAME,
};

use super::edge::ConditionalEdge;
use super::logging::{
    log_breakpoint, log_graph_complete, log_graph_error, log_graph_start, log_interrupt,
    log_node_complete, log_node_start, log_resume, log_stream_cancelled,
};
use super::node::Node;
use super::run_context::{RunContext, RunReceivers};
use super::state_graph::END;
use super::step::Step;

/// Compiled graph: immutable structure, supports invoke and stream.
///
/// Created by `StateGraph::compile()`. Runs from the entry point; after each
/// node the first edge leaving it picks the next node, until `END`.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: Arc<HashMap<String, Arc<dyn Node<S>>>>,
    pub(super) edges: Arc<Vec<ConditionalEdge<S>>>,
    pub(super) entry_point: String,
    pub(super) recursion_limit: usize,
    pub(super) breakpoints: Arc<HashSet<String>>,
    pub(super) stream_config: StreamConfig,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Serialize + 'static,
{
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    pub fn stream_config(&self) -> &StreamConfig {
        &self.stream_config
    }

    /// Creates a fresh context for one run, plus the receivers that observe it.
    ///
    /// Pass the context to [`invoke_with_context`](Self::invoke_with_context).
    /// Keep `interrupts` (and a clone of `ctx.interrupts()` for `resume`) when
    /// the graph has breakpoints or nodes that pause.
    pub fn run_context(&self) -> (RunContext<S>, RunReceivers<S>) {
        self.run_context_with_config(RunnableConfig::default())
    }

    pub fn run_context_with_config(
        &self,
        config: RunnableConfig,
    ) -> (RunContext<S>, RunReceivers<S>) {
        self.new_run_context(config, CancellationToken::new())
    }

    fn new_run_context(
        &self,
        config: RunnableConfig,
        cancel: CancellationToken,
    ) -> (RunContext<S>, RunReceivers<S>) {
        RunContext::new(
            config,
            self.stream_config.modes.iter().copied(),
            self.breakpoints.iter().cloned(),
            cancel,
        )
    }

    /// Runs the graph to completion and returns the final state.
    ///
    /// Nothing observes this run: emissions are discarded, and a breakpoint or
    /// node interrupt fails with `InterruptError::NoListener`. Use
    /// [`invoke_with_context`](Self::invoke_with_context) or [`stream`](Self::stream)
    /// to observe or pause a run.
    pub async fn invoke(&self, state: S) -> Result<S, GraphError> {
        let (ctx, receivers) = self.run_context();
        drop(receivers);
        self.invoke_with_context(state, &ctx).await
    }

    /// Runs the graph within `ctx` and returns the final state.
    ///
    /// Emission order: initial `Values` and run `on_chain_start`; per node
    /// `on_chain_start`, `on_chain_end`, `Updates`; final `Values` and run
    /// `on_chain_end`. Emissions wait while a subscribed receiver is full.
    pub async fn invoke_with_context(&self, state: S, ctx: &RunContext<S>) -> Result<S, GraphError> {
        log_graph_start(ctx.run_id(), &self.entry_point);
        let result = self.run_loop(state, ctx).await;
        match &result {
            Ok((_, steps)) => log_graph_complete(ctx.run_id(), *steps),
            Err(e) => log_graph_error(ctx.run_id(), e),
        }
        result.map(|(state, _)| state)
    }

    async fn run_loop(&self, mut state: S, ctx: &RunContext<S>) -> Result<(S, usize), GraphError> {
        let limit = ctx.config().recursion_limit.unwrap_or(self.recursion_limit);
        let streamer = ctx.streamer();

        streamer.emit_value(state.clone()).await;
        streamer
            .emit_event(ctx.event(EventType::ChainStart, RUN_EVENT_NAME))
            .await;

        let mut current = self.entry_point.clone();
        let mut steps = 0usize;
        loop {
            if steps >= limit {
                return Err(GraphError::RecursionLimitExceeded(limit));
            }
            if current == END {
                break;
            }

            if ctx.interrupts().has_breakpoint(&current) {
                log_breakpoint(ctx.run_id(), &current);
                state = self.pause(ctx, &current, None, &state).await?;
            }

            let node = self
                .nodes
                .get(&current)
                .cloned()
                .ok_or_else(|| GraphError::NodeNotFound(current.clone()))?;

            log_node_start(ctx.run_id(), &current, steps);
            streamer
                .emit_event(node_event(ctx, EventType::ChainStart, &current, steps))
                .await;

            match node.run(&ctx.for_node(&current), state.clone()).await {
                Ok(Step::Continue(next_state)) => state = next_state,
                Ok(Step::Interrupt(data)) => {
                    log_interrupt(ctx.run_id(), &current);
                    state = self.pause(ctx, &current, Some(data), &state).await?;
                    continue;
                }
                Err(source) => {
                    return Err(GraphError::NodeExecutionFailed {
                        node: current,
                        source,
                    })
                }
            }

            streamer
                .emit_event(node_event(ctx, EventType::ChainEnd, &current, steps))
                .await;
            streamer.emit_update(&current, state.clone()).await;

            let next = self.route(&current, &state)?;
            log_node_complete(ctx.run_id(), &current, &next);
            current = next;
            steps += 1;
        }

        streamer.emit_value(state.clone()).await;
        streamer
            .emit_event(ctx.event(EventType::ChainEnd, RUN_EVENT_NAME))
            .await;
        Ok((state, steps))
    }

    /// Publishes an interrupt for `node` and waits for the resumed state.
    async fn pause(
        &self,
        ctx: &RunContext<S>,
        node: &str,
        data: Option<Value>,
        state: &S,
    ) -> Result<S, GraphError> {
        let interrupts = ctx.interrupts();
        interrupts.interrupt(node, data, state).await?;
        let resumed = interrupts.wait_for_resume(ctx.cancellation()).await?;
        log_resume(ctx.run_id(), node);
        Ok(resumed)
    }

    /// First edge leaving `node` decides; first mapped candidate wins.
    fn route(&self, node: &str, state: &S) -> Result<String, GraphError> {
        let edge = self
            .edges
            .iter()
            .find(|e| e.from == node)
            .ok_or_else(|| GraphError::NoOutgoingEdge(node.to_string()))?;
        let candidates = edge.next_nodes(state).map_err(|source| GraphError::Router {
            node: node.to_string(),
            source,
        })?;
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| GraphError::InvalidRouterOutput(node.to_string()))
    }

    /// Streams a run in the background.
    ///
    /// `cancel` is the parent token: cancelling it, or calling
    /// [`RunStream::cancel`], stops forwarding and ends a pending pause. A node
    /// already executing is not aborted. Failures arrive as a final
    /// `on_chain_end` event named `LangGraph` with `metadata.error`.
    pub fn stream(&self, state: S, cancel: CancellationToken) -> RunStream<S> {
        self.stream_with_config(state, RunnableConfig::default(), cancel)
    }

    pub fn stream_with_config(
        &self,
        state: S,
        config: RunnableConfig,
        cancel: CancellationToken,
    ) -> RunStream<S> {
        let capacity = self.stream_config.channel_capacity();
        let (stream_tx, stream_rx) = mpsc::channel(capacity);
        let (event_tx, event_rx) = mpsc::channel(capacity);

        let cancel = cancel.child_token();
        let (ctx, receivers) = self.new_run_context(config, cancel.clone());
        let RunReceivers {
            events,
            stream,
            interrupts,
        } = receivers;
        let controller = ctx.interrupts().clone();
        let run_id = ctx.run_id().to_string();

        let graph = self.clone();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            let forwarder = tokio::spawn(forward(
                ctx.run_id().to_string(),
                StreamReceivers { events, stream },
                stream_tx,
                event_tx.clone(),
                task_cancel.clone(),
            ));

            let result = graph.invoke_with_context(state, &ctx).await;
            let failure = result.err().map(|err| {
                ctx.event(EventType::ChainEnd, RUN_EVENT_NAME)
                    .with_metadata("error", err.to_string())
            });
            drop(ctx);
            let _ = forwarder.await;

            if let Some(event) = failure {
                tokio::select! {
                    _ = event_tx.send(event) => {}
                    _ = task_cancel.cancelled() => {}
                }
            }
        });

        RunStream::new(stream_rx, event_rx, interrupts, controller, run_id, cancel, handle)
    }
}

fn node_event<S>(ctx: &RunContext<S>, event_type: EventType, node: &str, step: usize) -> Event
where
    S: Clone + Send + Sync + Serialize + 'static,
{
    ctx.event(event_type, node)
        .with_metadata("langgraph_step", step)
        .with_metadata("langgraph_node", node)
}

/// Copies the run's internal channels into the caller's buffered channels
/// until both close or `cancel` fires. A caller that dropped an output
/// receiver still gets its channel drained, so the run never stalls on it.
async fn forward<S>(
    run_id: String,
    mut rx: StreamReceivers<S>,
    stream_tx: mpsc::Sender<StreamEvent<S>>,
    event_tx: mpsc::Sender<Event>,
    cancel: CancellationToken,
) where
    S: Send + 'static,
{
    let mut events_open = true;
    let mut stream_open = true;
    while events_open || stream_open {
        tokio::select! {
            _ = cancel.cancelled() => {
                log_stream_cancelled(&run_id);
                return;
            }
            event = rx.events.recv(), if events_open => match event {
                Some(event) => {
                    tokio::select! {
                        _ = event_tx.send(event) => {}
                        _ = cancel.cancelled() => {
                            log_stream_cancelled(&run_id);
                            return;
                        }
                    }
                }
                None => events_open = false,
            },
            item = rx.stream.recv(), if stream_open => match item {
                Some(item) => {
                    tokio::select! {
                        _ = stream_tx.send(item) => {}
                        _ = cancel.cancelled() => {
                            log_stream_cancelled(&run_id);
                            return;
                        }
                    }
                }
                None => stream_open = false,
            },
        }
    }
}

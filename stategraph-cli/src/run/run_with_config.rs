//! Streams the demo graph and reports its output through `tracing`.
//!
//! Every pause (breakpoint) is logged and resumed with the paused state, so a
//! run with breakpoints still completes.

use stategraph::{CancellationToken, RunnableConfig, StreamEvent};

use crate::config::{Error, RunConfig};

use super::demo::{build_graph, DemoState};

/// Runs the demo graph with `config` and returns the final state.
///
/// Fails when the graph does not compile, when the run reports an error event,
/// or when it ends without a final `Values` snapshot (e.g. `values` mode off).
pub async fn run_with_config(config: &RunConfig) -> Result<DemoState, Error> {
    let compiled = build_graph(config).compile()?;

    let mut runnable = RunnableConfig::default().with_tag("demo");
    if let Some(id) = &config.run_id {
        runnable = runnable.with_run_id(id.as_str());
    }
    let mut run = compiled.stream_with_config(DemoState::default(), runnable, CancellationToken::new());
    tracing::info!(run_id = run.run_id(), "Streaming demo graph");

    let mut final_state = None;
    let mut failure = None;
    let mut stream_open = true;
    let mut events_open = true;
    let mut interrupts_open = true;
    while stream_open || events_open {
        tokio::select! {
            item = run.stream.recv(), if stream_open => match item {
                Some(StreamEvent::Values(state)) => {
                    if state.result != 0.0 {
                        tracing::info!(result = state.result, "Calculation result");
                    }
                    if !state.poem.is_empty() {
                        tracing::info!(poem = %state.poem, "Generated poem");
                    }
                    final_state = Some(state);
                }
                Some(StreamEvent::Messages { chunk, metadata }) => {
                    tracing::info!(node = %metadata.langgraph_node, content = %chunk.content, "Message");
                }
                Some(other) => tracing::debug!(mode = %other.mode(), "Stream item"),
                None => stream_open = false,
            },
            event = run.events.recv(), if events_open => match event {
                Some(event) => match event.error() {
                    Some(error) => failure = Some(error.to_string()),
                    None => tracing::info!(
                        event = event.event_type.as_str(),
                        name = %event.name,
                        metadata = %serde_json::Value::Object(event.metadata.clone()),
                        "Event"
                    ),
                },
                None => events_open = false,
            },
            info = run.interrupts.recv(), if interrupts_open => match info {
                Some(info) => {
                    tracing::info!(node = %info.node_name, "Paused at breakpoint; resuming");
                    let state: DemoState = info.state_as()?;
                    run.resume(state).await?;
                }
                None => interrupts_open = false,
            },
        }
    }
    run.join().await;

    if let Some(error) = failure {
        return Err(error.into());
    }
    final_state.ok_or_else(|| Error::from("run ended without a final values snapshot"))
}

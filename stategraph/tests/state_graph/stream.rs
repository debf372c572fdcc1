//! stream(): background runs, stream modes, lifecycle events, cancellation.

use serde_json::json;
use stategraph::{
    always, AgentError, CancellationToken, EventType, InterruptError, RunnableConfig, StateGraph,
    Step, StreamConfig, StreamEvent, StreamMode, END, RUN_EVENT_NAME,
};
use tokio_stream::StreamExt;

use crate::common::{add_visit_node, calc_graph, loop_while_below, within, CalcState, Trail};

/// **Scenario**: Default stream config delivers initial and final Values, then closes.
#[tokio::test]
async fn stream_delivers_values_then_closes() {
    let compiled = calc_graph().compile().unwrap();
    let run = compiled.stream(CalcState::default(), CancellationToken::new());
    assert!(run.run_id().starts_with("run-"));

    let items: Vec<_> = within(run.into_value_stream().collect::<Vec<_>>()).await;
    assert_eq!(items.len(), 2);
    match (&items[0], &items[1]) {
        (StreamEvent::Values(first), StreamEvent::Values(last)) => {
            assert_eq!(first.result, 0.0);
            assert_eq!(last.result, 55.0);
        }
        other => panic!("expected two Values, got {:?}", other),
    }
}

/// **Scenario**: Debug mode emits run start, node start, node end, run end, in that order.
#[tokio::test]
async fn debug_events_follow_execution_order() {
    let mut graph = calc_graph();
    graph.set_stream_config(StreamConfig::new([StreamMode::Debug], 16));
    let compiled = graph.compile().unwrap();

    let config = RunnableConfig::default()
        .with_run_id("run-fixed")
        .with_tag("demo");
    let run = compiled.stream_with_config(CalcState::default(), config, CancellationToken::new());
    assert_eq!(run.run_id(), "run-fixed");

    let events: Vec<_> = within(run.into_event_stream().collect::<Vec<_>>()).await;
    let seen: Vec<_> = events
        .iter()
        .map(|e| (e.event_type, e.name.as_str()))
        .collect();
    assert_eq!(
        seen,
        vec![
            (EventType::ChainStart, RUN_EVENT_NAME),
            (EventType::ChainStart, "calculate"),
            (EventType::ChainEnd, "calculate"),
            (EventType::ChainEnd, RUN_EVENT_NAME),
        ]
    );
    assert!(events.iter().all(|e| e.run_id == "run-fixed"));
    assert!(events.iter().all(|e| e.tags == vec!["demo".to_string()]));
    assert_eq!(events[1].metadata["langgraph_step"], 0);
    assert_eq!(events[1].metadata["langgraph_node"], "calculate");
    assert!(events[0].is_run_event());
    assert!(events.iter().all(|e| e.error().is_none()));
}

/// **Scenario**: A failing run ends with an on_chain_end LangGraph event carrying the error.
#[tokio::test]
async fn failed_run_reports_error_event() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_fn("a", |_ctx, _s: Trail| async move {
            Err(AgentError::ExecutionFailed("boom".into()))
        })
        .set_entry_point("a");
    let compiled = graph.compile().unwrap();

    let run = compiled.stream(Trail::default(), CancellationToken::new());
    let events: Vec<_> = within(run.into_event_stream().collect::<Vec<_>>()).await;

    let last = events.last().expect("error event");
    assert_eq!(last.event_type, EventType::ChainEnd);
    assert_eq!(last.name, RUN_EVENT_NAME);
    let error = last.error().expect("error metadata");
    assert!(error.contains("error in node a"), "{}", error);
    assert!(error.contains("boom"), "{}", error);
}

/// **Scenario**: Nodes publish custom payloads and message chunks attributed to themselves.
#[tokio::test]
async fn nodes_emit_custom_and_messages() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_fn("poet", |ctx, s: Trail| async move {
            ctx.emit_custom(json!({ "progress": 0.5 })).await;
            ctx.emit_message("roses are red").await;
            Ok(Step::Continue(s.visit("poet")))
        })
        .add_conditional_edges("poet", always(END), None)
        .set_entry_point("poet")
        .set_stream_config(StreamConfig::new(
            [StreamMode::Custom, StreamMode::Messages],
            8,
        ));
    let compiled = graph.compile().unwrap();

    let run = compiled.stream(Trail::default(), CancellationToken::new());
    let items: Vec<_> = within(run.into_value_stream().collect::<Vec<_>>()).await;
    assert_eq!(items.len(), 2);
    match &items[0] {
        StreamEvent::Custom(value) => assert_eq!(value["progress"], 0.5),
        other => panic!("expected Custom, got {:?}", other),
    }
    match &items[1] {
        StreamEvent::Messages { chunk, metadata } => {
            assert_eq!(chunk.content, "roses are red");
            assert_eq!(metadata.langgraph_node, "poet");
        }
        other => panic!("expected Messages, got {:?}", other),
    }
}

/// **Scenario**: A caller that drops both outputs does not stall the run.
#[tokio::test]
async fn dropped_outputs_do_not_stall_run() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_fn("inc", |_ctx, mut s: Trail| async move {
            s.value += 1;
            Ok(Step::Continue(s))
        })
        .add_conditional_edges("inc", loop_while_below(20, "inc"), None)
        .set_entry_point("inc")
        .set_stream_config(StreamConfig::new(
            [StreamMode::Values, StreamMode::Updates, StreamMode::Debug],
            1,
        ));
    let compiled = graph.compile().unwrap();

    let run = compiled.stream(Trail::default(), CancellationToken::new());
    within(run.join()).await;
}

/// **Scenario**: Cancelling a run paused at a breakpoint ends it and closes its outputs.
#[tokio::test]
async fn cancel_ends_paused_run() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "a");
    graph
        .add_conditional_edges("a", always(END), None)
        .set_entry_point("a")
        .add_breakpoint("a");
    let compiled = graph.compile().unwrap();

    let mut run = compiled.stream(Trail::default(), CancellationToken::new());
    let info = within(run.interrupts.recv()).await.expect("breakpoint");
    assert_eq!(info.node_name, "a");

    run.cancel();
    assert!(run.cancellation_token().is_cancelled());
    while within(run.stream.recv()).await.is_some() {}
    let controller = run.controller().clone();
    within(run.join()).await;

    assert!(!controller.is_interrupted());
    assert!(matches!(
        controller.resume(Trail::default()).await,
        Err(InterruptError::NotInterrupted)
    ));
}

/// **Scenario**: Cancelling the parent token passed to stream() cancels the run too.
#[tokio::test]
async fn parent_token_cancels_run() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "a");
    graph
        .add_conditional_edges("a", always(END), None)
        .set_entry_point("a")
        .add_breakpoint("a");
    let compiled = graph.compile().unwrap();

    let parent = CancellationToken::new();
    let mut run = compiled.stream(Trail::default(), parent.clone());
    within(run.interrupts.recv()).await.expect("breakpoint");

    parent.cancel();
    assert!(run.cancellation_token().is_cancelled());
    within(run.join()).await;
}

//! Invoke: final state, routing rules, recursion limit and run errors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stategraph::{
    always, AgentError, GraphError, InterruptError, RunnableConfig, StateGraph, Step,
    StreamConfig, StreamEvent, StreamMode, END, START,
};

use crate::common::{add_visit_node, calc_graph, loop_while_below, within, CalcState, Trail};

/// Graph `a` routing to itself, counting executions.
fn self_loop(limit: usize, count: Arc<AtomicUsize>) -> StateGraph<Trail> {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_fn("a", move |_ctx, mut s: Trail| {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                s.value += 1;
                Ok(Step::Continue(s))
            }
        })
        .add_conditional_edges("a", always("a"), None)
        .set_entry_point("a")
        .set_recursion_limit(limit);
    graph
}

/// **Scenario**: calculate -> END yields 55, emitting initial Values, one Updates, final Values.
#[tokio::test]
async fn calculate_then_end_streams_values_and_update() {
    let mut graph = calc_graph();
    graph.set_stream_config(StreamConfig::new(
        [StreamMode::Values, StreamMode::Updates],
        10,
    ));
    let compiled = graph.compile().unwrap();

    let (ctx, mut rx) = compiled.run_context();
    let collector = tokio::spawn(async move {
        let mut items = Vec::new();
        while let Some(item) = rx.stream.recv().await {
            items.push(item);
        }
        items
    });

    let out = within(compiled.invoke_with_context(CalcState::default(), &ctx))
        .await
        .unwrap();
    drop(ctx);
    let items = within(collector).await.unwrap();

    assert_eq!(out.result, 55.0);
    assert_eq!(items.len(), 3);
    match &items[0] {
        StreamEvent::Values(s) => assert_eq!(s.result, 0.0),
        other => panic!("expected initial Values, got {:?}", other),
    }
    match &items[1] {
        StreamEvent::Updates { node_id, state } => {
            assert_eq!(node_id, "calculate");
            assert_eq!(state.result, 55.0);
        }
        other => panic!("expected Updates, got {:?}", other),
    }
    match &items[2] {
        StreamEvent::Values(s) => assert_eq!(s.result, 55.0),
        other => panic!("expected final Values, got {:?}", other),
    }
}

/// **Scenario**: With limit 1 a node that routes to itself runs once, then the run fails.
#[tokio::test]
async fn recursion_limit_one_stops_self_loop() {
    let count = Arc::new(AtomicUsize::new(0));
    let compiled = self_loop(1, Arc::clone(&count)).compile().unwrap();

    match within(compiled.invoke(Trail::default())).await {
        Err(GraphError::RecursionLimitExceeded(1)) => {}
        other => panic!("expected RecursionLimitExceeded(1), got {:?}", other),
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

/// **Scenario**: The limit is checked before END, so a run needing exactly `limit`
/// executions fails after its last node even though that node routes to END.
#[tokio::test]
async fn recursion_limit_checked_before_end() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut graph = StateGraph::<Trail>::new();
    for name in ["a", "b"] {
        let count = Arc::clone(&count);
        graph.add_fn(name, move |_ctx, s: Trail| {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(Step::Continue(s.visit(name)))
            }
        });
    }
    graph
        .add_conditional_edges("a", always("b"), None)
        .add_conditional_edges("b", always(END), None)
        .set_entry_point("a")
        .set_recursion_limit(2);
    let compiled = graph.compile().unwrap();

    match within(compiled.invoke(Trail::default())).await {
        Err(GraphError::RecursionLimitExceeded(2)) => {}
        other => panic!("expected RecursionLimitExceeded(2), got {:?}", other),
    }
    assert_eq!(count.load(Ordering::SeqCst), 2);

    graph.set_recursion_limit(3);
    let roomier = graph.compile().unwrap();
    let out = within(roomier.invoke(Trail::default())).await.unwrap();
    assert_eq!(out.visited, vec!["a", "b"]);
}

/// **Scenario**: A single node routing to END fails under limit 1.
#[tokio::test]
async fn recursion_limit_one_fails_single_node_graph() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "calc");
    graph
        .add_conditional_edges("calc", always(END), None)
        .set_entry_point("calc")
        .set_recursion_limit(1);
    let compiled = graph.compile().unwrap();

    assert!(matches!(
        within(compiled.invoke(Trail::default())).await,
        Err(GraphError::RecursionLimitExceeded(1))
    ));
}

/// **Scenario**: Limit 0 fails before any node runs.
#[tokio::test]
async fn recursion_limit_zero_runs_nothing() {
    let count = Arc::new(AtomicUsize::new(0));
    let compiled = self_loop(0, Arc::clone(&count)).compile().unwrap();

    assert!(matches!(
        within(compiled.invoke(Trail::default())).await,
        Err(GraphError::RecursionLimitExceeded(0))
    ));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

/// **Scenario**: RunnableConfig.recursion_limit overrides the graph's limit for one run.
#[tokio::test]
async fn config_recursion_limit_overrides_graph_limit() {
    let count = Arc::new(AtomicUsize::new(0));
    let compiled = self_loop(100, Arc::clone(&count)).compile().unwrap();

    let (ctx, rx) =
        compiled.run_context_with_config(RunnableConfig::default().with_recursion_limit(3));
    drop(rx);
    match within(compiled.invoke_with_context(Trail::default(), &ctx)).await {
        Err(GraphError::RecursionLimitExceeded(3)) => {}
        other => panic!("expected RecursionLimitExceeded(3), got {:?}", other),
    }
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unknown_entry_point_is_node_not_found() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "a");
    graph.set_entry_point("x");
    let compiled = graph.compile().unwrap();

    match within(compiled.invoke(Trail::default())).await {
        Err(GraphError::NodeNotFound(name)) => assert_eq!(name, "x"),
        other => panic!("expected NodeNotFound, got {:?}", other),
    }
}

/// **Scenario**: Router output is translated through the edge mapping.
#[tokio::test]
async fn mapping_translates_router_output() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "check");
    add_visit_node(&mut graph, "approve");
    add_visit_node(&mut graph, "reject");
    let router = |s: &Trail| -> Result<Vec<String>, AgentError> {
        Ok(vec![if s.value > 0 { "yes" } else { "no" }.to_string()])
    };
    let mapping = HashMap::from([
        ("yes".to_string(), "approve".to_string()),
        ("no".to_string(), "reject".to_string()),
    ]);
    graph
        .add_conditional_edges("check", router, Some(mapping))
        .add_conditional_edges("approve", always(END), None)
        .add_conditional_edges("reject", always(END), None)
        .set_entry_point("check");
    let compiled = graph.compile().unwrap();

    let approved = within(compiled.invoke(Trail {
        value: 1,
        ..Trail::default()
    }))
    .await
    .unwrap();
    assert_eq!(approved.visited, vec!["check", "approve"]);

    let rejected = within(compiled.invoke(Trail::default())).await.unwrap();
    assert_eq!(rejected.visited, vec!["check", "reject"]);
}

/// **Scenario**: When several edges leave a node only the first registered one routes,
/// and only the first candidate it returns is followed.
#[tokio::test]
async fn first_edge_and_first_candidate_win() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "a");
    add_visit_node(&mut graph, "b");
    add_visit_node(&mut graph, "c");
    let fan_out = |_: &Trail| -> Result<Vec<String>, AgentError> {
        Ok(vec!["b".to_string(), "c".to_string()])
    };
    graph
        .add_conditional_edges("a", fan_out, None)
        .add_conditional_edges("a", always("c"), None)
        .add_conditional_edges("b", always(END), None)
        .add_conditional_edges("c", always(END), None)
        .set_entry_point("a");
    let compiled = graph.compile().unwrap();

    let out = within(compiled.invoke(Trail::default())).await.unwrap();
    assert_eq!(out.visited, vec!["a", "b"]);
}

/// **Scenario**: START edges are accepted but execution begins at the entry point.
#[tokio::test]
async fn start_edge_is_not_executed() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "a");
    graph
        .add_conditional_edges(START, always("a"), None)
        .add_conditional_edges("a", always(END), None)
        .set_entry_point("a");
    let compiled = graph.compile().unwrap();

    let out = within(compiled.invoke(Trail::default())).await.unwrap();
    assert_eq!(out.visited, vec!["a"]);
}

/// **Scenario**: A loop routed by state runs until its router sends it to END.
#[tokio::test]
async fn loop_runs_until_router_ends() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_fn("inc", |_ctx, mut s: Trail| async move {
            s.value += 1;
            Ok(Step::Continue(s.visit("inc")))
        })
        .add_conditional_edges("inc", loop_while_below(4, "inc"), None)
        .set_entry_point("inc");
    let compiled = graph.compile().unwrap();

    let out = within(compiled.invoke(Trail::default())).await.unwrap();
    assert_eq!(out.value, 4);
    assert_eq!(out.visited.len(), 4);
}

#[tokio::test]
async fn missing_edge_is_no_outgoing_edge() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "a");
    graph.set_entry_point("a");
    let compiled = graph.compile().unwrap();

    match within(compiled.invoke(Trail::default())).await {
        Err(GraphError::NoOutgoingEdge(name)) => assert_eq!(name, "a"),
        other => panic!("expected NoOutgoingEdge, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_router_output_is_invalid() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "a");
    let nowhere = |_: &Trail| -> Result<Vec<String>, AgentError> { Ok(Vec::new()) };
    graph
        .add_conditional_edges("a", nowhere, None)
        .set_entry_point("a");
    let compiled = graph.compile().unwrap();

    match within(compiled.invoke(Trail::default())).await {
        Err(GraphError::InvalidRouterOutput(name)) => assert_eq!(name, "a"),
        other => panic!("expected InvalidRouterOutput, got {:?}", other),
    }
}

#[tokio::test]
async fn router_error_names_the_node() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "a");
    let broken = |_: &Trail| -> Result<Vec<String>, AgentError> {
        Err(AgentError::ExecutionFailed("no route".into()))
    };
    graph
        .add_conditional_edges("a", broken, None)
        .set_entry_point("a");
    let compiled = graph.compile().unwrap();

    match within(compiled.invoke(Trail::default())).await {
        Err(GraphError::Router { node, source }) => {
            assert_eq!(node, "a");
            assert_eq!(source.to_string(), "execution failed: no route");
        }
        other => panic!("expected Router error, got {:?}", other),
    }
}

/// **Scenario**: A failing node aborts the run and the error names the node.
#[tokio::test]
async fn node_error_aborts_run() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_fn("a", |_ctx, _s: Trail| async move {
            Err(AgentError::ExecutionFailed("boom".into()))
        })
        .add_fn("b", move |_ctx, s: Trail| {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(Step::Continue(s))
            }
        })
        .add_conditional_edges("a", always("b"), None)
        .add_conditional_edges("b", always(END), None)
        .set_entry_point("a");
    let compiled = graph.compile().unwrap();

    let err = within(compiled.invoke(Trail::default())).await.unwrap_err();
    assert!(matches!(err, GraphError::NodeExecutionFailed { ref node, .. } if node == "a"));
    assert_eq!(err.to_string(), "error in node a: execution failed: boom");
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

/// **Scenario**: invoke() has nobody to hand a pause to, so a breakpoint fails fast.
#[tokio::test]
async fn invoke_with_breakpoint_has_no_listener() {
    let mut graph = StateGraph::<Trail>::new();
    add_visit_node(&mut graph, "a");
    graph
        .add_conditional_edges("a", always(END), None)
        .set_entry_point("a")
        .add_breakpoint("a");
    let compiled = graph.compile().unwrap();

    match within(compiled.invoke(Trail::default())).await {
        Err(GraphError::Interrupt(InterruptError::NoListener)) => {}
        other => panic!("expected NoListener, got {:?}", other),
    }
}

/// **Scenario**: One compiled graph serves concurrent runs without mixing their state.
#[tokio::test]
async fn concurrent_runs_are_isolated() {
    let mut graph = StateGraph::<Trail>::new();
    graph
        .add_fn("double", |_ctx, mut s: Trail| async move {
            tokio::task::yield_now().await;
            s.value *= 2;
            Ok(Step::Continue(s))
        })
        .add_conditional_edges("double", always(END), None)
        .set_entry_point("double");
    let compiled = graph.compile().unwrap();

    let runs = (1..=8).map(|v| {
        let compiled = compiled.clone();
        tokio::spawn(async move {
            compiled
                .invoke(Trail {
                    value: v,
                    ..Trail::default()
                })
                .await
        })
    });
    for (v, handle) in (1..=8).zip(runs.collect::<Vec<_>>()) {
        let out = within(handle).await.unwrap().unwrap();
        assert_eq!(out.value, v * 2);
    }
}

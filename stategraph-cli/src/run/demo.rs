//! The demo graph: `calculate` (sum of squares 1..=5) then `write_poem`.
//!
//! Both step functions are deterministic and report what they do as message
//! chunks, so the demo runs offline.

use serde::{Deserialize, Serialize};
use stategraph::{always, StateGraph, Step, END, START};

use crate::config::RunConfig;

/// State of the demo run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoState {
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub result: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub poem: String,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

fn compose_poem(n: f64) -> String {
    format!(
        "Five small squares climb in a line,\n\
         one, four, nine, sixteen, twenty-five;\n\
         stacked together they make {},\n\
         a quiet sum that feels alive.",
        n
    )
}

/// Builds `START -> calculate -> write_poem -> END` with the config's
/// stream modes, recursion limit and breakpoints.
pub fn build_graph(config: &RunConfig) -> StateGraph<DemoState> {
    let mut graph = StateGraph::<DemoState>::new();
    graph
        .add_fn("calculate", |ctx, mut state: DemoState| async move {
            let question = "Calculate the sum of squares from 1 to 5".to_string();
            ctx.emit_message(question.as_str()).await;
            state.messages.push(question);

            state.result = (1..=5).map(|i: i32| i * i).sum::<i32>() as f64;
            let answer = format!("1 + 4 + 9 + 16 + 25 = {}", state.result);
            ctx.emit_message(answer.as_str()).await;
            state.messages.push(answer);
            Ok(Step::Continue(state))
        })
        .add_fn("write_poem", |ctx, mut state: DemoState| async move {
            let request = format!("Write a short poem about the number {}", state.result);
            ctx.emit_message(request.as_str()).await;
            state.messages.push(request);

            state.poem = compose_poem(state.result);
            ctx.emit_message(state.poem.as_str()).await;
            state.messages.push(state.poem.clone());
            Ok(Step::Continue(state))
        })
        .add_conditional_edges(START, always("calculate"), None)
        .add_conditional_edges("calculate", always("write_poem"), None)
        .add_conditional_edges("write_poem", always(END), None)
        .set_entry_point("calculate")
        .set_recursion_limit(config.recursion_limit)
        .set_stream_config(config.stream_config());
    for name in &config.breakpoints {
        graph.add_breakpoint(name.as_str());
    }
    graph
}

//! State graph: nodes + conditional edges, compile, invoke and stream.
//!
//! Build a [`StateGraph`], register nodes and routers, set the entry point,
//! compile it, then run the [`CompiledStateGraph`] with `invoke` (returns the
//! final state) or `stream` (returns a [`RunStream`](crate::stream::RunStream)).

mod command;
mod compile_error;
mod compiled;
mod edge;
pub mod logging;
mod node;
mod run_context;
mod state_graph;
mod step;

pub use command::{Command, Send};
pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use edge::{always, Always, ConditionalEdge, Router};
pub use node::{FnNode, Node};
pub use run_context::{RunContext, RunReceivers};
pub use state_graph::{StateGraph, DEFAULT_RECURSION_LIMIT, END, START};
pub use step::Step;

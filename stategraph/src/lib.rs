//! # stategraph
//!
//! A typed, node-and-edge state-graph engine. One state type flows through
//! named nodes; after each node a router picks the next one, until the run
//! reaches [`END`].
//!
//! ## Design Principles
//!
//! - **Single state type**: every node of a graph receives and returns the same `S`.
//! - **Conditional edges**: one router per node, with an optional name mapping.
//!   The first edge leaving a node decides, and the first candidate it yields wins.
//! - **Per-run context**: each run owns its run id, streamer and interrupt
//!   manager ([`RunContext`]), so one compiled graph serves concurrent runs.
//! - **Backpressure**: emissions wait while a subscribed receiver is full.
//!   Dropping a receiver opts out of that output.
//! - **Pauses**: breakpoints pause before a node; a node pauses itself by
//!   returning [`Step::Interrupt`]. The controller answers with `resume(state)`.
//!
//! ## Main Modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, `Step`, routers.
//! - [`stream`]: stream modes, lifecycle events, `Streamer`, `RunStream`.
//! - [`interrupt`]: `InterruptManager`, `InterruptInfo`, breakpoints.
//! - [`serializer`]: JSON state marshalling.
//! - [`config`]: per-run `RunnableConfig`.
//! - [`error`]: `AgentError` (node/router failures) and `GraphError` (run failures).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde::Serialize;
//! use stategraph::{always, StateGraph, Step, END};
//!
//! #[derive(Clone, Default, Serialize)]
//! struct Calc { result: i64 }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut graph = StateGraph::<Calc>::new();
//! graph
//!     .add_fn("calculate", |_ctx, mut s: Calc| async move {
//!         s.result = (1..=10).sum();
//!         Ok(Step::Continue(s))
//!     })
//!     .add_conditional_edges("calculate", always(END), None)
//!     .set_entry_point("calculate");
//!
//! let compiled = graph.compile().unwrap();
//! let out = compiled.invoke(Calc::default()).await.unwrap();
//! assert_eq!(out.result, 55);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod interrupt;
pub mod serializer;
pub mod stream;

pub use config::RunnableConfig;
pub use error::{AgentError, GraphError};
pub use graph::{
    always, Always, Command, CompilationError, CompiledStateGraph, ConditionalEdge, FnNode, Node,
    RunContext, RunReceivers, Router, StateGraph, Step, DEFAULT_RECURSION_LIMIT, END, START,
};
pub use interrupt::{InterruptError, InterruptInfo, InterruptManager};
pub use serializer::{marshal_state, unmarshal_state, JsonSerializer, SerializationError, Serializer};
pub use stream::{
    Event, EventType, MessageChunk, RunStream, StreamConfig, StreamEvent, StreamMetadata,
    StreamMode, Streamer, UnknownStreamMode, RUN_EVENT_NAME,
};
pub use tokio_util::sync::CancellationToken;

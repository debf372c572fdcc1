//! Error types for step functions, routers and graph execution.
//!
//! [`AgentError`] is what user code (nodes and routers) returns; [`GraphError`]
//! is what `CompiledStateGraph::invoke` returns. Engine errors wrap the user
//! error together with the node it came from.

use thiserror::Error;

use crate::interrupt::InterruptError;

/// Failure raised by a step function or router.
///
/// The engine never retries on this error; it wraps it in
/// [`GraphError::NodeExecutionFailed`] or [`GraphError::Router`] and aborts the run.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, tool error).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Any other error raised by user code.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Fatal error for a single run of a compiled graph.
///
/// Every variant aborts the current run. Interrupts requested by a node are
/// not errors (see [`Step::Interrupt`](crate::graph::Step::Interrupt)); only
/// misuse of the interrupt rendezvous surfaces here as [`GraphError::Interrupt`].
#[derive(Debug, Error)]
pub enum GraphError {
    /// More node executions were needed than the recursion limit allows.
    #[error("recursion limit ({0}) exceeded")]
    RecursionLimitExceeded(usize),

    /// Current node name is not registered and is not END.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No conditional edge starts at the node that just ran.
    #[error("no outgoing edge from node: {0}")]
    NoOutgoingEdge(String),

    /// Router for the given node returned no candidate names.
    #[error("invalid router output: router for node {0} returned no nodes")]
    InvalidRouterOutput(String),

    /// Router for the given node failed.
    #[error("error in router for node {node}: {source}")]
    Router {
        node: String,
        #[source]
        source: AgentError,
    },

    /// Step function of the given node failed.
    #[error("error in node {node}: {source}")]
    NodeExecutionFailed {
        node: String,
        #[source]
        source: AgentError,
    },

    /// Breakpoint or interrupt could not be delivered or resumed.
    #[error("interrupt failed: {0}")]
    Interrupt(#[from] InterruptError),
}

//! State graph: named nodes + conditional edges (from → router).
//!
//! Add nodes with `add_node` / `add_fn`, route between them with
//! `add_conditional_edges`, pick where to begin with `set_entry_point`, then
//! `compile` to get a `CompiledStateGraph`. `START` may appear as an edge
//! origin for readability; execution always begins at the entry point.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use crate::error::AgentError;
use crate::stream::StreamConfig;

use super::compile_error::CompilationError;
use super::compiled::CompiledStateGraph;
use super::edge::{ConditionalEdge, Router};
use super::node::{FnNode, Node};
use super::run_context::RunContext;
use super::step::Step;

/// Synthetic graph origin; never executed.
pub const START: &str = "__start__";

/// Terminal sentinel: routing here ends the run without running a node.
pub const END: &str = "__end__";

/// Maximum node executions per run unless overridden.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// State graph: nodes plus conditional edges.
///
/// Generic over state type `S`. Nodes are keyed by name (last `add_node`
/// wins); edges keep insertion order, and the first edge whose `from` matches
/// the current node is the one that routes.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>` and routers; produces
/// `CompiledStateGraph<S>`. Breakpoints and stream config set here seed every
/// run of the compiled graph.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: Vec<ConditionalEdge<S>>,
    entry_point: String,
    recursion_limit: usize,
    breakpoints: HashSet<String>,
    stream_config: StreamConfig,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Serialize + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Serialize + 'static,
{
    /// Creates an empty graph with the default recursion limit and stream config.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            entry_point: String::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            breakpoints: HashSet::new(),
            stream_config: StreamConfig::default(),
        }
    }

    /// Adds a node; replaces any node with the same name.
    pub fn add_node(&mut self, name: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(name.into(), node);
        self
    }

    /// Adds an async closure as a node.
    ///
    /// ```rust,ignore
    /// graph.add_fn("calc", |_ctx, mut s: MyState| async move {
    ///     s.result = 55.0;
    ///     Ok(Step::Continue(s))
    /// });
    /// ```
    pub fn add_fn<F, Fut>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(RunContext<S>, S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Step<S>, AgentError>> + Send + 'static,
    {
        self.add_node(name, Arc::new(FnNode::new(f)))
    }

    /// Appends a conditional edge from `from`.
    ///
    /// After `from` runs, `router` is called with the new state; every returned
    /// name is translated through `mapping` when present (unknown names pass
    /// through) and the first result becomes the next node.
    pub fn add_conditional_edges(
        &mut self,
        from: impl Into<String>,
        router: impl Router<S> + 'static,
        mapping: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.edges
            .push(ConditionalEdge::new(from, Arc::new(router), mapping));
        self
    }

    /// Sets the node where execution begins.
    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry_point = name.into();
        self
    }

    /// Sets the maximum number of node executions per run. Zero fails on the first step.
    pub fn set_recursion_limit(&mut self, limit: usize) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    /// Pauses every run before `name` executes, on every visit.
    pub fn add_breakpoint(&mut self, name: impl Into<String>) -> &mut Self {
        self.breakpoints.insert(name.into());
        self
    }

    pub fn remove_breakpoint(&mut self, name: &str) -> &mut Self {
        self.breakpoints.remove(name);
        self
    }

    /// Replaces the stream config used by runs of graphs compiled afterwards.
    pub fn set_stream_config(&mut self, config: StreamConfig) -> &mut Self {
        self.stream_config = config;
        self
    }

    pub fn entry_point(&self) -> Option<&str> {
        (!self.entry_point.is_empty()).then_some(self.entry_point.as_str())
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    pub fn stream_config(&self) -> &StreamConfig {
        &self.stream_config
    }

    /// Builds the executable graph.
    ///
    /// Fails only when no entry point is set. The compiled graph holds its own
    /// snapshot of nodes, edges and settings; later edits to this builder do
    /// not affect it.
    pub fn compile(&self) -> Result<CompiledStateGraph<S>, CompilationError> {
        if self.entry_point.is_empty() {
            return Err(CompilationError::EntryPointNotSet);
        }

        Ok(CompiledStateGraph {
            nodes: Arc::new(self.nodes.clone()),
            edges: Arc::new(self.edges.clone()),
            entry_point: self.entry_point.clone(),
            recursion_limit: self.recursion_limit,
            breakpoints: Arc::new(self.breakpoints.clone()),
            stream_config: self.stream_config.clone(),
        })
    }
}

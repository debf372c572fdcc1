//! Graph node trait: one step in a StateGraph.
//!
//! Receives the run context and state `S`, returns a [`Step`] with the updated
//! `S` or a pause request. Used by `StateGraph` and `CompiledStateGraph`.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::AgentError;

use super::{RunContext, Step};

/// One step in a graph: state in, state out.
///
/// The node gets the context of the current run (run id, cancellation,
/// custom/message emission) and owns the state it is given. The engine keeps
/// its own copy, so a node that pauses via [`Step::Interrupt`] leaves the
/// current state untouched.
///
/// **Interaction**: Registered with `StateGraph::add_node`; called by
/// `CompiledStateGraph::invoke_with_context`.
#[async_trait]
pub trait Node<S>: Send + Sync {
    async fn run(&self, ctx: &RunContext<S>, state: S) -> Result<Step<S>, AgentError>;
}

/// Adapts an async closure `(RunContext<S>, S) -> Result<Step<S>, AgentError>` into a [`Node`].
///
/// Built by `StateGraph::add_fn`; the context is cloned per call.
pub struct FnNode<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnNode<F, Fut> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _fut: PhantomData,
        }
    }
}

#[async_trait]
impl<S, F, Fut> Node<S> for FnNode<F, Fut>
where
    S: Clone + Send + Sync + 'static,
    F: Fn(RunContext<S>, S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Step<S>, AgentError>> + Send,
{
    async fn run(&self, ctx: &RunContext<S>, state: S) -> Result<Step<S>, AgentError> {
        (self.f)(ctx.clone(), state).await
    }
}

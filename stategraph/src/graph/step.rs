//! Step result from a graph node: continue with a new state, or pause.
//!
//! The graph runner uses this to decide whether to route onward or to hand
//! the run to the interrupt controller and retry the same node after resume.

use serde_json::Value;

/// Outcome of one node execution.
///
/// - **Continue(state)**: the node finished; `state` replaces the current state
///   and the node's router picks the next node.
/// - **Interrupt(data)**: the node asks to pause. The run emits an
///   `InterruptInfo` carrying `data` and the state the node was given, waits
///   for `resume`, then runs the same node again with the resumed state.
///
/// **Interaction**: Returned by `Node::run`; consumed by `CompiledStateGraph::invoke_with_context`.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<S> {
    Continue(S),
    Interrupt(Value),
}

impl<S> Step<S> {
    /// Pause request carrying `data` to the controller.
    pub fn interrupt(data: impl Into<Value>) -> Self {
        Step::Interrupt(data.into())
    }

    pub fn is_interrupt(&self) -> bool {
        matches!(self, Step::Interrupt(_))
    }
}

impl<S> From<S> for Step<S> {
    fn from(state: S) -> Self {
        Step::Continue(state)
    }
}

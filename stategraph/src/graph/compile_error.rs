//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the graph cannot be run at all.
//! Node names referenced by routers are not checked here; unknown names
//! surface at run time as `GraphError::NodeNotFound`.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// `set_entry_point` was never called (or was called with an empty name).
    #[error("entry point not set")]
    EntryPointNotSet,
}

//! Partial-update and explicit-dispatch records.
//!
//! Reserved for per-node partial state updates (`Command`) and dispatching a
//! node with its own state (`Send`). The engine does not consume them yet:
//! routing is decided by conditional edges only.

use serde::{Deserialize, Serialize};

/// State update combined with a routing instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command<S> {
    pub update: S,
    pub goto: String,
}

impl<S> Command<S> {
    pub fn new(update: S, goto: impl Into<String>) -> Self {
        Self {
            update,
            goto: goto.into(),
        }
    }
}

/// A node to run with a state of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Send<S> {
    pub node: String,
    pub state: S,
}

impl<S> Send<S> {
    pub fn new(node: impl Into<String>, state: S) -> Self {
        Self {
            node: node.into(),
            state,
        }
    }
}

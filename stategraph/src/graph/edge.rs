//! Conditional edges: a router picks the next node after `from` runs.
//!
//! The router returns candidate names; an optional mapping translates each
//! candidate before dispatch. Only the first candidate is followed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AgentError;

/// Chooses the next node(s) from the state a node just produced.
///
/// Implemented for any `Fn(&S) -> Result<Vec<String>, AgentError> + Send + Sync`.
pub trait Router<S>: Send + Sync {
    fn route(&self, state: &S) -> Result<Vec<String>, AgentError>;
}

impl<S, F> Router<S> for F
where
    F: Fn(&S) -> Result<Vec<String>, AgentError> + Send + Sync,
{
    fn route(&self, state: &S) -> Result<Vec<String>, AgentError> {
        self(state)
    }
}

/// Router that always picks the same node; see [`always`].
#[derive(Clone, Debug)]
pub struct Always(String);

impl<S> Router<S> for Always {
    fn route(&self, _state: &S) -> Result<Vec<String>, AgentError> {
        Ok(vec![self.0.clone()])
    }
}

/// Router that always picks `node`.
pub fn always(node: impl Into<String>) -> Always {
    Always(node.into())
}

/// Edge from one node, routed at run time.
pub struct ConditionalEdge<S> {
    pub from: String,
    router: Arc<dyn Router<S>>,
    /// Router output name -> node name. Names not in the map pass through.
    pub mapping: Option<HashMap<String, String>>,
}

impl<S> Clone for ConditionalEdge<S> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            router: Arc::clone(&self.router),
            mapping: self.mapping.clone(),
        }
    }
}

impl<S> ConditionalEdge<S> {
    pub fn new(
        from: impl Into<String>,
        router: Arc<dyn Router<S>>,
        mapping: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            from: from.into(),
            router,
            mapping,
        }
    }

    /// Runs the router and applies the mapping to every returned name.
    pub fn next_nodes(&self, state: &S) -> Result<Vec<String>, AgentError> {
        let names = self.router.route(state)?;
        Ok(match &self.mapping {
            Some(mapping) => names
                .into_iter()
                .map(|name| mapping.get(&name).cloned().unwrap_or(name))
                .collect(),
            None => names,
        })
    }
}

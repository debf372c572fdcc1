//! Per-run config: run id override, tags, recursion limit override, metadata.
//!
//! Passed to `CompiledStateGraph::run_context_with_config` and
//! `CompiledStateGraph::stream_with_config`. Everything is optional; the
//! default config runs with the graph's own settings.

use serde_json::{Map, Value};

/// Config for a single run.
///
/// **Interaction**: Copied into [`RunContext`](crate::graph::RunContext); the
/// engine reads `recursion_limit`, and every emitted `Event` carries `tags`
/// and `metadata`.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Use this run id instead of a generated one.
    pub run_id: Option<String>,
    /// Tags copied onto every event of the run.
    pub tags: Vec<String>,
    /// Overrides the graph's recursion limit for this run only.
    pub recursion_limit: Option<usize>,
    /// Extra metadata merged into every event of the run. Engine keys win on conflict.
    pub metadata: Map<String, Value>,
}

impl RunnableConfig {
    /// Sets the run id.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Appends a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the recursion limit override.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    /// Inserts one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

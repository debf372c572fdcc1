//! Optional overrides for a demo run (CLI args or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options) and
//! [`run_with_options`](crate::run_with_options).

use stategraph::StreamMode;

/// Overrides applied on top of the env-based [`RunConfig`](super::RunConfig).
///
/// Only set fields override; `breakpoints` are added to the configured ones.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Replace the stream modes.
    pub stream_modes: Option<Vec<StreamMode>>,
    /// Replace the stream buffer size.
    pub buffer_size: Option<usize>,
    /// Replace the recursion limit.
    pub recursion_limit: Option<usize>,
    /// Nodes to pause before; the demo resumes each pause with the unchanged state.
    pub breakpoints: Vec<String>,
    /// Fixed run id instead of a generated one.
    pub run_id: Option<String>,
    /// Show debug logs (node start/complete, routing).
    pub verbose: bool,
}

//! Logging utilities for graph execution.
//!
//! Structured `tracing` records for run boundaries, node execution, routing
//! decisions and pauses. Every record carries the run id.

use crate::error::GraphError;

/// Log run start.
pub fn log_graph_start(run_id: &str, entry_point: &str) {
    tracing::info!(run_id, entry_point, "Starting graph execution");
}

/// Log run completion.
pub fn log_graph_complete(run_id: &str, steps: usize) {
    tracing::info!(run_id, steps, "Graph execution complete");
}

/// Log a fatal run error.
pub fn log_graph_error(run_id: &str, error: &GraphError) {
    tracing::error!(run_id, %error, "Graph execution error");
}

/// Log node execution start.
pub fn log_node_start(run_id: &str, node: &str, step: usize) {
    tracing::debug!(run_id, node, step, "Starting node execution");
}

/// Log node completion and the routing decision.
pub fn log_node_complete(run_id: &str, node: &str, next: &str) {
    tracing::debug!(run_id, node, next, "Node execution complete");
}

/// Log a breakpoint hit before `node` runs.
pub fn log_breakpoint(run_id: &str, node: &str) {
    tracing::info!(run_id, node, "Breakpoint hit");
}

/// Log an interrupt requested by `node`.
pub fn log_interrupt(run_id: &str, node: &str) {
    tracing::info!(run_id, node, "Node requested interrupt");
}

/// Log resumption at `node`.
pub fn log_resume(run_id: &str, node: &str) {
    tracing::info!(run_id, node, "Resumed");
}

/// Log that stream forwarding stopped because of cancellation.
pub fn log_stream_cancelled(run_id: &str) {
    tracing::debug!(run_id, "Stream forwarding cancelled");
}

//! Streaming types for graph runs.
//!
//! Defines stream modes, lifecycle [`Event`]s and data [`StreamEvent`]s. The
//! engine publishes them through a [`Streamer`]; `CompiledStateGraph::stream`
//! hands them to the caller through a [`RunStream`].

mod run_stream;
mod streamer;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use run_stream::RunStream;
pub use streamer::{StreamReceivers, Streamer};

/// Name used for whole-run events, as opposed to per-node events.
pub const RUN_EVENT_NAME: &str = "LangGraph";

/// Stream mode selector: which kinds of output to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    /// Full state at run start and run end.
    Values,
    /// State after each node completes.
    Updates,
    /// Custom JSON payloads from nodes.
    Custom,
    /// Message chunks (e.g. LLM tokens) from nodes.
    Messages,
    /// Lifecycle events on the event channel.
    Debug,
}

impl StreamMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamMode::Values => "values",
            StreamMode::Updates => "updates",
            StreamMode::Custom => "custom",
            StreamMode::Messages => "messages",
            StreamMode::Debug => "debug",
        }
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown stream mode name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown stream mode: {0}")]
pub struct UnknownStreamMode(pub String);

impl FromStr for StreamMode {
    type Err = UnknownStreamMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "values" => Ok(StreamMode::Values),
            "updates" => Ok(StreamMode::Updates),
            "custom" => Ok(StreamMode::Custom),
            "messages" => Ok(StreamMode::Messages),
            "debug" => Ok(StreamMode::Debug),
            other => Err(UnknownStreamMode(other.to_string())),
        }
    }
}

/// Streaming configuration: active modes and output buffer size.
///
/// `buffer_size` sizes the two output channels of `CompiledStateGraph::stream`.
/// Zero is treated as one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub modes: HashSet<StreamMode>,
    pub buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            modes: HashSet::from([StreamMode::Values]),
            buffer_size: 100,
        }
    }
}

impl StreamConfig {
    pub fn new(modes: impl IntoIterator<Item = StreamMode>, buffer_size: usize) -> Self {
        Self {
            modes: modes.into_iter().collect(),
            buffer_size,
        }
    }

    pub(crate) fn channel_capacity(&self) -> usize {
        self.buffer_size.max(1)
    }
}

/// Kind of lifecycle event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "on_chain_start")]
    ChainStart,
    #[serde(rename = "on_chain_end")]
    ChainEnd,
    #[serde(rename = "on_chain_stream")]
    ChainStream,
    #[serde(rename = "on_chat_model_start")]
    ChatModelStart,
    #[serde(rename = "on_chat_model_stream")]
    ChatModelStream,
    #[serde(rename = "on_chat_model_end")]
    ChatModelEnd,
    #[serde(rename = "on_channel_write")]
    ChannelWrite,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ChainStart => "on_chain_start",
            EventType::ChainEnd => "on_chain_end",
            EventType::ChainStream => "on_chain_stream",
            EventType::ChatModelStart => "on_chat_model_start",
            EventType::ChatModelStream => "on_chat_model_stream",
            EventType::ChatModelEnd => "on_chat_model_end",
            EventType::ChannelWrite => "on_channel_write",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete lifecycle notification (run or node start/end).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event")]
    pub event_type: EventType,
    /// Node name, or [`RUN_EVENT_NAME`] for whole-run events.
    pub name: String,
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_ids: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Creates an event stamped with the current time.
    pub fn new(event_type: EventType, name: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            event_type,
            name: name.into(),
            run_id: run_id.into(),
            tags: Vec::new(),
            metadata: Map::new(),
            data: None,
            parent_ids: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// True for the run-level start/end events.
    pub fn is_run_event(&self) -> bool {
        self.name == RUN_EVENT_NAME
    }

    /// Error message carried by a terminal event of a failed stream, if any.
    pub fn error(&self) -> Option<&str> {
        self.metadata.get("error").and_then(Value::as_str)
    }
}

/// Metadata attached to streamed messages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    /// Node that produced the message.
    pub langgraph_node: String,
}

/// One chunk of streamed message content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageChunk {
    pub content: String,
}

/// Data emitted while running a graph, tagged by the mode that produced it.
#[derive(Clone, Debug)]
pub enum StreamEvent<S> {
    /// Full state snapshot (run start and run end).
    Values(S),
    /// State after the given node finished.
    Updates { node_id: String, state: S },
    /// Message chunk emitted by a node.
    Messages {
        chunk: MessageChunk,
        metadata: StreamMetadata,
    },
    /// Custom JSON payload emitted by a node.
    Custom(Value),
}

impl<S> StreamEvent<S> {
    /// Mode that produced this event.
    pub fn mode(&self) -> StreamMode {
        match self {
            StreamEvent::Values(_) => StreamMode::Values,
            StreamEvent::Updates { .. } => StreamMode::Updates,
            StreamEvent::Messages { .. } => StreamMode::Messages,
            StreamEvent::Custom(_) => StreamMode::Custom,
        }
    }
}

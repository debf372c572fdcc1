//! Serializer for graph state (state <-> bytes).
//!
//! Used to persist or transmit state snapshots, e.g. the `state` field of an
//! [`InterruptInfo`](crate::interrupt::InterruptInfo) or the state handed back
//! to `resume`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Error when converting state to or from its JSON byte form.
#[derive(Debug, Error)]
#[error("state serialization failed: {0}")]
pub struct SerializationError(String);

/// Converts state to and from bytes.
pub trait Serializer<S>: Send + Sync {
    fn serialize(&self, state: &S) -> Result<Vec<u8>, SerializationError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<S, SerializationError>;
}

/// JSON bytes via [`marshal_state`] / [`unmarshal_state`].
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl<S: Serialize + DeserializeOwned> Serializer<S> for JsonSerializer {
    fn serialize(&self, state: &S) -> Result<Vec<u8>, SerializationError> {
        marshal_state(state)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, SerializationError> {
        unmarshal_state(bytes)
    }
}

/// Marshals a state value to JSON bytes.
pub fn marshal_state<S: Serialize>(state: &S) -> Result<Vec<u8>, SerializationError> {
    serde_json::to_vec(state).map_err(|e| SerializationError(e.to_string()))
}

/// Unmarshals JSON bytes into a state value.
pub fn unmarshal_state<S: DeserializeOwned>(bytes: &[u8]) -> Result<S, SerializationError> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError(e.to_string()))
}

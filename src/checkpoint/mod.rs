//! Checkpoint and resume functionality for machines.
//!
//! A checkpoint captures a machine's current state and transition history,
//! so an instance can be inspected offline or rebuilt after a restart. Rules,
//! guards and actions are not serializable and are supplied again by the
//! transition table at restore time.

use crate::core::{Event, State, StateHistory};
use crate::engine::{Machine, TransitionTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub mod error;

pub use error::{CheckpointError, Format};

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<S: State, E: Event> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Current state of the machine
    pub current_state: S,

    /// Complete transition history
    pub history: StateHistory<S, E>,
}

impl<S: State, E: Event> Checkpoint<S, E> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::Encode {
            format: Format::Json,
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::Decode {
            format: Format::Json,
            reason: e.to_string(),
        })
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::Encode {
            format: Format::Binary,
            reason: e.to_string(),
        })
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes).map_err(|e| CheckpointError::Decode {
            format: Format::Binary,
            reason: e.to_string(),
        })
    }
}

impl<S: State, E: Event> Machine<S, E> {
    /// Capture the machine's state and history.
    pub fn checkpoint(&self) -> Checkpoint<S, E> {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            current_state: self.current_state().clone(),
            history: self.history().clone(),
        }
    }

    /// Rebuild a machine from a checkpoint.
    ///
    /// The restored machine has no interceptor or listeners; attach them
    /// before sending events that must be persisted.
    pub fn restore(
        table: Arc<TransitionTable<S, E>>,
        checkpoint: Checkpoint<S, E>,
    ) -> Result<Self, CheckpointError> {
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let mut machine = Machine::new(table, checkpoint.current_state)?;
        machine.restore_history(checkpoint.history);
        Ok(machine)
    }
}

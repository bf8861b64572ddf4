//! Checkpoint error types.

use crate::builder::ConfigurationError;
use thiserror::Error;

/// Wire format a checkpoint was being converted to or from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Binary,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Binary => f.write_str("binary"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Encoding {format} checkpoint failed: {reason}")]
    Encode { format: Format, reason: String },

    #[error("Decoding {format} checkpoint failed: {reason}")]
    Decode { format: Format, reason: String },

    #[error("Checkpoint version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The checkpointed state does not belong to the table being restored against.
    #[error("Checkpoint does not fit the transition table: {0}")]
    Incompatible(#[from] ConfigurationError),
}

//! Persistence error types.

use thiserror::Error;

/// Errors raised by repositories and the persistence interceptor.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PersistenceError {
    /// No entity is stored under the given id
    #[error("Entity '{id}' not found")]
    NotFound { id: String },

    /// The backing store rejected or could not complete the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Event metadata carried an id that does not decode to the entity's id type
    #[error("Metadata key '{key}' does not hold a valid entity id: {reason}")]
    InvalidIdentity { key: String, reason: String },
}
